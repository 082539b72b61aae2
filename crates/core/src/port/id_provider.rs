// Schedule ID source

/// Hands out schedule ids; swapped for a fixed sequence in tests
pub trait IdProvider: Send + Sync {
    /// Fresh schedule id.
    ///
    /// The service only accepts lowercase alphanumerics and inner dashes.
    fn generate_id(&self) -> String;
}

/// Random v4 UUID in lowercase hyphenated form
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().hyphenated().to_string()
    }
}
