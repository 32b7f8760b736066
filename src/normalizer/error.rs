use thiserror::Error;

/// Why a listing was rejected. Every variant is local to one listing; the
/// caller skips it and moves on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("malformed title {title:?}: {reason}")]
    MalformedName { title: String, reason: &'static str },

    #[error("malformed spec item {item:?}: {reason}")]
    MalformedSpec { item: String, reason: &'static str },

    #[error("malformed price {0:?}")]
    MalformedPrice(String),

    #[error("unparsable {field} {value:?}: {reason}")]
    UnparsableListing {
        field: String,
        value: String,
        reason: &'static str,
    },

    #[error("malformed VIN report: {0}")]
    MalformedVinReport(String),
}

impl NormalizeError {
    /// Short label used to group rejections in run stats.
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizeError::MalformedName { .. } => "malformed_name",
            NormalizeError::MalformedSpec { .. } => "malformed_spec",
            NormalizeError::MalformedPrice(_) => "malformed_price",
            NormalizeError::UnparsableListing { .. } => "unparsable_listing",
            NormalizeError::MalformedVinReport(_) => "malformed_vin_report",
        }
    }

    pub(crate) fn name(title: &str, reason: &'static str) -> Self {
        NormalizeError::MalformedName {
            title: title.to_string(),
            reason,
        }
    }

    pub(crate) fn spec(item: &str, reason: &'static str) -> Self {
        NormalizeError::MalformedSpec {
            item: item.to_string(),
            reason,
        }
    }

    pub(crate) fn unparsable(field: &str, value: &str, reason: &'static str) -> Self {
        NormalizeError::UnparsableListing {
            field: field.to_string(),
            value: value.to_string(),
            reason,
        }
    }
}
