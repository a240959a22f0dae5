use serde::{Deserialize, Serialize};

use super::ranking::Ranked;
use crate::modules::store::Model;

/// Site address columns. `url` is free text; no URL validation applies.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct WebSiteFields {
    pub title: Option<String>,
    pub url: String,
    pub display_order: i64,
}

pub trait WebSite: Model + Ranked {
    fn site(&self) -> &WebSiteFields;
    fn site_mut(&mut self) -> &mut WebSiteFields;

    fn display_title(&self) -> String {
        let fields = self.site();
        match &fields.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => fields.url.clone(),
        }
    }
}
