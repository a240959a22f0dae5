//! Concrete entities and spy stores shared by the unit tests

use std::cell::Cell;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::auth::{
    authenticate_with_credentials, AppUser, Credential, CredentialFields, Login, PasswordHasher,
    PasswordHolder, Pbkdf2Hasher, SimpleAppUser,
};
use crate::modules::choices::Enumeration;
use crate::modules::contact::{
    default_address_types, ContactFields, ContactInfo, PhoneFields, PhoneNumber, Ranked, WebSite,
    WebSiteFields,
};
use crate::modules::email::{EmailFields, MultipleEmail, VerifiableEmail};
use crate::modules::hashing::{declare_hash_column, AutoHash};
use crate::modules::lifecycle::SoftDelete;
use crate::modules::store::{
    Filter, MemoryStore, Model, ModelError, ModelSchema, RecordId, Row, SchemaBuilder, Store,
    StoreError,
};

pub static FAST_HASHER: Pbkdf2Hasher = Pbkdf2Hasher::new(1_000);
pub static OUTDATED_HASHER: Pbkdf2Hasher = Pbkdf2Hasher::new(500);

// ---- users ----

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Member {
    pub id: Option<RecordId>,
    pub hash: Option<String>,
    pub username: String,
    pub password: Option<String>,
    pub date_deleted: Option<DateTime<Utc>>,
}

impl Member {
    pub fn new(username: &str) -> Self {
        Self {
            id: None,
            hash: None,
            username: username.to_string(),
            password: None,
            date_deleted: None,
        }
    }
}

impl Model for Member {
    const TABLE: &'static str = "members";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn declare_schema(schema: &mut SchemaBuilder) {
        declare_hash_column(schema);
    }

    fn pre_save(&mut self) -> Result<(), ModelError> {
        self.ensure_hash().map(|_| ())
    }

    fn pre_delete(&self) -> Result<(), ModelError> {
        Self::deny_hard_delete()
    }
}

impl AutoHash for Member {
    const AUTOHASH_SECRET: &'static str = "member-secret";
    const AUTOHASH_FIELDS: &'static [&'static str] = &["username"];

    fn hash_token(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn set_hash_token(&mut self, token: String) {
        self.hash = Some(token);
    }
}

impl Login for Member {}

impl PasswordHolder for Member {
    fn password_hash(&self) -> Option<&str> {
        self.password.as_deref()
    }

    fn store_password_hash(&mut self, encoded: Option<String>) {
        self.password = encoded;
    }

    fn password_hasher() -> &'static dyn PasswordHasher {
        &FAST_HASHER
    }
}

impl SimpleAppUser for Member {}

impl SoftDelete for Member {
    fn date_deleted(&self) -> Option<DateTime<Utc>> {
        self.date_deleted
    }

    fn set_date_deleted(&mut self, instant: Option<DateTime<Utc>>) {
        self.date_deleted = instant;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Option<RecordId>,
    pub hash: Option<String>,
    pub name: String,
}

impl Account {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            hash: None,
            name: name.to_string(),
        }
    }
}

impl Model for Account {
    const TABLE: &'static str = "accounts";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn declare_schema(schema: &mut SchemaBuilder) {
        declare_hash_column(schema);
    }

    fn pre_save(&mut self) -> Result<(), ModelError> {
        self.ensure_hash().map(|_| ())
    }
}

impl AutoHash for Account {
    const AUTOHASH_SECRET: &'static str = "account-secret";
    const AUTOHASH_FIELDS: &'static [&'static str] = &["name"];

    fn hash_token(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn set_hash_token(&mut self, token: String) {
        self.hash = Some(token);
    }
}

impl Login for Account {
    const LOGIN_ID_KEY: &'static str = "account_id";
    const LOGIN_REQUEST_KEY: &'static str = "account";
}

impl AppUser for Account {
    /// `proof` is the credential identifier followed by the secret parts
    fn authenticate<S: Store>(
        store: &mut S,
        credential_type: i64,
        proof: &[&str],
    ) -> Result<Option<Self>, ModelError> {
        match proof.split_first() {
            Some((identifier, rest)) => authenticate_with_credentials::<AccountCredential, S>(
                store,
                credential_type,
                identifier,
                rest,
            ),
            None => Ok(None),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccountCredential {
    pub id: Option<RecordId>,
    pub user_id: Option<RecordId>,
    #[serde(flatten)]
    pub fields: CredentialFields,
}

impl AccountCredential {
    pub const PASSWORD: i64 = 1;
    pub const DEVICE: i64 = 2;

    pub fn password(account: &Account, login: &str) -> Self {
        Self {
            id: None,
            user_id: account.id,
            fields: CredentialFields::new(Self::PASSWORD, login),
        }
    }

    pub fn device(account: &Account, device_id: &str, secret: &str) -> Self {
        let mut fields = CredentialFields::new(Self::DEVICE, device_id);
        fields.data2 = Some(secret.to_string());
        Self {
            id: None,
            user_id: account.id,
            fields,
        }
    }
}

impl Model for AccountCredential {
    const TABLE: &'static str = "account_credentials";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn declare_schema(schema: &mut SchemaBuilder) {
        Self::declare_credential_choices(schema);
    }
}

impl Credential for AccountCredential {
    type User = Account;

    fn credential_types() -> Enumeration<i64> {
        Enumeration::new()
            .with(Self::PASSWORD, "PASSWORD", "Password")
            .with(Self::DEVICE, "DEVICE", "Device")
    }

    fn fields(&self) -> &CredentialFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut CredentialFields {
        &mut self.fields
    }

    fn user_id(&self) -> Option<RecordId> {
        self.user_id
    }

    fn authenticate<S: Store>(
        &mut self,
        store: &mut S,
        user: &Account,
        proof: &[&str],
    ) -> Result<bool, ModelError> {
        if user.id.is_none() || self.user_id != user.id {
            return Ok(false);
        }
        let secret = match proof.first() {
            Some(secret) => *secret,
            None => return Ok(false),
        };

        match self.fields.credential_type {
            Self::PASSWORD => self.check_password(store, secret),
            Self::DEVICE => Ok(self.fields.data2.as_deref() == Some(secret)),
            _ => Ok(false),
        }
    }
}

impl PasswordHolder for AccountCredential {
    const PASSWORD_FIELD: &'static str = "data2";

    fn password_hash(&self) -> Option<&str> {
        self.fields.data2.as_deref()
    }

    fn store_password_hash(&mut self, encoded: Option<String>) {
        self.fields.data2 = encoded;
    }

    fn password_hasher() -> &'static dyn PasswordHasher {
        &FAST_HASHER
    }
}

// ---- hashed records ----

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: Option<RecordId>,
    pub hash: Option<String>,
    pub seat: String,
    pub event_date: String,
}

impl Ticket {
    pub fn new(seat: &str, event_date: &str) -> Self {
        Self {
            id: None,
            hash: None,
            seat: seat.to_string(),
            event_date: event_date.to_string(),
        }
    }
}

impl Model for Ticket {
    const TABLE: &'static str = "tickets";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn declare_schema(schema: &mut SchemaBuilder) {
        declare_hash_column(schema);
    }

    fn pre_save(&mut self) -> Result<(), ModelError> {
        self.ensure_hash().map(|_| ())
    }
}

impl AutoHash for Ticket {
    const AUTOHASH_SECRET: &'static str = "ticket-secret";
    const AUTOHASH_FIELDS: &'static [&'static str] = &["seat", "event_date"];
    const AUTOHASH_NO_DATETIME: bool = true;

    fn hash_token(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn set_hash_token(&mut self, token: String) {
        self.hash = Some(token);
    }
}

/// Same columns as `Ticket` under another table and secret; hashes on demand only
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Voucher {
    pub id: Option<RecordId>,
    pub hash: Option<String>,
    pub seat: String,
    pub event_date: String,
}

impl Voucher {
    pub fn new(seat: &str, event_date: &str) -> Self {
        Self {
            id: None,
            hash: None,
            seat: seat.to_string(),
            event_date: event_date.to_string(),
        }
    }
}

impl Model for Voucher {
    const TABLE: &'static str = "vouchers";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn declare_schema(schema: &mut SchemaBuilder) {
        declare_hash_column(schema);
    }

    fn pre_save(&mut self) -> Result<(), ModelError> {
        self.ensure_hash().map(|_| ())
    }
}

impl AutoHash for Voucher {
    const AUTOHASH_SECRET: &'static str = "voucher-secret";
    const AUTOHASH_FIELDS: &'static [&'static str] = &["seat", "event_date"];
    const AUTOHASH_NO_DATETIME: bool = true;
    const AUTOHASH_ALLOW_EMPTY: bool = true;

    fn hash_token(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn set_hash_token(&mut self, token: String) {
        self.hash = Some(token);
    }
}

/// Misconfigured: no secret
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Unkeyed {
    pub id: Option<RecordId>,
    pub hash: Option<String>,
}

impl Model for Unkeyed {
    const TABLE: &'static str = "unkeyed";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn pre_save(&mut self) -> Result<(), ModelError> {
        self.ensure_hash().map(|_| ())
    }
}

impl AutoHash for Unkeyed {
    const AUTOHASH_SECRET: &'static str = "";

    fn hash_token(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn set_hash_token(&mut self, token: String) {
        self.hash = Some(token);
    }
}

// ---- email ----

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Email {
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub email: EmailFields,
}

impl Email {
    pub fn new(address: &str) -> Self {
        Self {
            id: None,
            email: EmailFields::new(address),
        }
    }
}

impl Model for Email {
    const TABLE: &'static str = "emails";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn declare_schema(schema: &mut SchemaBuilder) {
        Self::declare_email_choices(schema);
    }
}

impl VerifiableEmail for Email {
    fn email(&self) -> &EmailFields {
        &self.email
    }

    fn email_mut(&mut self) -> &mut EmailFields {
        &mut self.email
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LabelledEmail {
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub email: EmailFields,
    pub title: Option<String>,
    pub display_order: i64,
}

impl LabelledEmail {
    pub fn new(address: &str, title: Option<&str>, display_order: i64) -> Self {
        Self {
            id: None,
            email: EmailFields::new(address),
            title: title.map(str::to_string),
            display_order,
        }
    }
}

impl Model for LabelledEmail {
    const TABLE: &'static str = "labelled_emails";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn declare_schema(schema: &mut SchemaBuilder) {
        Self::declare_email_choices(schema);
    }
}

impl VerifiableEmail for LabelledEmail {
    fn email(&self) -> &EmailFields {
        &self.email
    }

    fn email_mut(&mut self) -> &mut EmailFields {
        &mut self.email
    }
}

impl Ranked for LabelledEmail {
    fn display_order(&self) -> i64 {
        self.display_order
    }
}

impl MultipleEmail for LabelledEmail {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

// ---- contact ----

/// Uses the default number types
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Phone {
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub phone: PhoneFields,
}

impl Phone {
    pub fn new(number: &str, number_type: i64) -> Self {
        Self {
            id: None,
            phone: PhoneFields::new(number, number_type),
        }
    }
}

impl Model for Phone {
    const TABLE: &'static str = "phones";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn declare_schema(schema: &mut SchemaBuilder) {
        Self::declare_phone_choices(schema);
    }
}

impl Ranked for Phone {
    fn display_order(&self) -> i64 {
        self.phone.display_order
    }
}

impl PhoneNumber for Phone {
    fn phone(&self) -> &PhoneFields {
        &self.phone
    }

    fn phone_mut(&mut self) -> &mut PhoneFields {
        &mut self.phone
    }
}

/// Narrows the number types to its own set
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MobilePhone {
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub phone: PhoneFields,
}

impl MobilePhone {
    pub fn new(number: &str, number_type: i64) -> Self {
        Self {
            id: None,
            phone: PhoneFields::new(number, number_type),
        }
    }
}

impl Model for MobilePhone {
    const TABLE: &'static str = "mobile_phones";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn declare_schema(schema: &mut SchemaBuilder) {
        Self::declare_phone_choices(schema);
    }
}

impl Ranked for MobilePhone {
    fn display_order(&self) -> i64 {
        self.phone.display_order
    }
}

impl PhoneNumber for MobilePhone {
    fn number_types() -> Enumeration<i64> {
        Enumeration::new()
            .with(3, "CELL", "Cell/Mobile")
            .with(10, "SATELLITE", "Satellite")
    }

    fn phone(&self) -> &PhoneFields {
        &self.phone
    }

    fn phone_mut(&mut self) -> &mut PhoneFields {
        &mut self.phone
    }
}

/// Widens the address types with MAILING
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub contact: ContactFields,
}

impl Model for Address {
    const TABLE: &'static str = "addresses";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn declare_schema(schema: &mut SchemaBuilder) {
        Self::declare_contact_choices(schema);
    }
}

impl Ranked for Address {
    fn display_order(&self) -> i64 {
        self.contact.display_order
    }
}

impl ContactInfo for Address {
    fn address_types() -> Enumeration<i64> {
        default_address_types().with(2, "MAILING", "Mailing")
    }

    fn contact(&self) -> &ContactFields {
        &self.contact
    }

    fn contact_mut(&mut self) -> &mut ContactFields {
        &mut self.contact
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Site {
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub site: WebSiteFields,
}

impl Site {
    pub fn new(url: &str, title: Option<&str>, display_order: i64) -> Self {
        Self {
            id: None,
            site: WebSiteFields {
                title: title.map(str::to_string),
                url: url.to_string(),
                display_order,
            },
        }
    }
}

impl Model for Site {
    const TABLE: &'static str = "sites";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}

impl Ranked for Site {
    fn display_order(&self) -> i64 {
        self.site.display_order
    }
}

impl WebSite for Site {
    fn site(&self) -> &WebSiteFields {
        &self.site
    }

    fn site_mut(&mut self) -> &mut WebSiteFields {
        &mut self.site
    }
}

// ---- stores ----

/// Counts reads so tests can assert a code path stays off the store
pub struct CountingStore {
    inner: MemoryStore,
    reads: Cell<usize>,
}

impl CountingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            reads: Cell::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl Store for CountingStore {
    fn insert(&mut self, schema: &ModelSchema, row: Row) -> Result<RecordId, StoreError> {
        self.inner.insert(schema, row)
    }

    fn update(
        &mut self,
        schema: &ModelSchema,
        id: RecordId,
        changes: Row,
    ) -> Result<(), StoreError> {
        self.inner.update(schema, id, changes)
    }

    fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        self.reads.set(self.reads.get() + 1);
        self.inner.select(table, filter)
    }

    fn update_where(
        &mut self,
        schema: &ModelSchema,
        filter: &Filter,
        changes: Row,
    ) -> Result<usize, StoreError> {
        self.inner.update_where(schema, filter, changes)
    }

    fn delete(&mut self, table: &str, id: RecordId) -> Result<bool, StoreError> {
        self.inner.delete(table, id)
    }

    fn atomic<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.inner.snapshot();
        let result = work(self);
        if result.is_err() {
            self.inner.restore(snapshot);
        }
        result
    }
}

/// Bulk updates can be switched to fail, everything else works
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_bulk: bool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_bulk_updates(&mut self, fail: bool) {
        self.fail_bulk = fail;
    }
}

impl Store for FlakyStore {
    fn insert(&mut self, schema: &ModelSchema, row: Row) -> Result<RecordId, StoreError> {
        self.inner.insert(schema, row)
    }

    fn update(
        &mut self,
        schema: &ModelSchema,
        id: RecordId,
        changes: Row,
    ) -> Result<(), StoreError> {
        self.inner.update(schema, id, changes)
    }

    fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        self.inner.select(table, filter)
    }

    fn update_where(
        &mut self,
        schema: &ModelSchema,
        filter: &Filter,
        changes: Row,
    ) -> Result<usize, StoreError> {
        if self.fail_bulk {
            return Err(StoreError::Io("bulk update unavailable".to_string()));
        }
        self.inner.update_where(schema, filter, changes)
    }

    fn delete(&mut self, table: &str, id: RecordId) -> Result<bool, StoreError> {
        self.inner.delete(table, id)
    }

    fn atomic<T, E, F>(&mut self, work: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.inner.snapshot();
        let result = work(self);
        if result.is_err() {
            self.inner.restore(snapshot);
        }
        result
    }
}
