use crate::modules::store::objects::first;
use crate::modules::store::{Filter, Model, ModelError, Store};

pub const DISPLAY_ORDER_FIELD: &str = "display_order";

/// Records ranked by a caller-assigned display order
pub trait Ranked {
    fn display_order(&self) -> i64;
}

/// Lowest display order wins; ties go to the earliest item
pub fn best<T: Ranked>(items: &[T]) -> Option<&T> {
    items.iter().fold(None, |top, item| match top {
        Some(current) if current.display_order() <= item.display_order() => Some(current),
        _ => Some(item),
    })
}

/// `best` over the rows matching `filter`, ties broken by primary key
pub fn best_stored<M: Model + Ranked, S: Store>(
    store: &S,
    filter: Filter,
) -> Result<Option<M>, ModelError> {
    first(store, &filter.order_by(DISPLAY_ORDER_FIELD))
}
