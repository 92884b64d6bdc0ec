//! The schema capability interface.

/// A named record shape.
///
/// A schema is a collection of property names. The same schema may be exposed
/// by several systems and the same property may appear in several schemas.
pub trait Schema: Send + Sync {
    /// The schema name, unique across the registry.
    fn name(&self) -> &str;

    /// Property names in declaration order.
    fn properties(&self) -> &[String];

    /// Returns `true` if this schema declares `prop`.
    fn has_property(&self, prop: &str) -> bool {
        self.properties().iter().any(|p| p == prop)
    }
}

impl std::fmt::Debug for dyn Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name())
            .field("properties", &self.properties())
            .finish()
    }
}
