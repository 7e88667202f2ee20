pub const DEFAULT_IDENTIFIER: &str = "X000000000";
pub const DEFAULT_SKU: &str = "SKU123";
pub const DEFAULT_DESCRIPTION: &str = "Sample Product";
pub const DEFAULT_COUNTRY: &str = "UK";

/// Printed content of one label. The identifier is also the barcode payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFields {
    pub identifier: String,
    pub sku: String,
    pub description: String,
    pub country: String,
}

impl Default for LabelFields {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER.to_string(),
            sku: DEFAULT_SKU.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

impl LabelFields {
    /// Build from optional values; missing or blank values take the defaults.
    pub fn from_parts(
        identifier: Option<&str>,
        sku: Option<&str>,
        description: Option<&str>,
        country: Option<&str>,
    ) -> Self {
        fn pick(value: Option<&str>, default: &str) -> String {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        }

        Self {
            identifier: pick(identifier, DEFAULT_IDENTIFIER),
            sku: pick(sku, DEFAULT_SKU),
            description: pick(description, DEFAULT_DESCRIPTION),
            country: pick(country, DEFAULT_COUNTRY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let fields = LabelFields::default();
        assert_eq!(fields.identifier, "X000000000");
        assert_eq!(fields.sku, "SKU123");
        assert_eq!(fields.description, "Sample Product");
        assert_eq!(fields.country, "UK");
    }

    #[test]
    fn test_blank_values_fall_back() {
        let fields = LabelFields::from_parts(Some("  "), Some("ABC-1"), None, Some(" DE "));
        assert_eq!(fields.identifier, DEFAULT_IDENTIFIER);
        assert_eq!(fields.sku, "ABC-1");
        assert_eq!(fields.description, DEFAULT_DESCRIPTION);
        assert_eq!(fields.country, "DE");
    }
}
