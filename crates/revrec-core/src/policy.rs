use rust_decimal::Decimal;

/// Tunables that shape validation, allocation and posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionPolicy {
    /// Allowed gap between allocated total and contract value.
    pub allocation_tolerance: Decimal,
    /// Decimal places allocated shares are rounded to; `None` keeps full precision.
    pub allocation_scale: Option<u32>,
    /// Whether reversing a posted entry gives the amount back to its obligation.
    pub reversal_restores_balance: bool,
    /// Whether generated entries are dated inside the target period when "today" is not.
    pub clamp_recognition_date: bool,
}

impl Default for RecognitionPolicy {
    fn default() -> Self {
        Self {
            allocation_tolerance: Decimal::new(1, 2),
            allocation_scale: None,
            reversal_restores_balance: false,
            clamp_recognition_date: true,
        }
    }
}
