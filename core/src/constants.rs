// Board configuration constants
// The frontend draws the same board - row count and slot tables must match!

/// Peg rows a chip bounces through before landing
pub const ROW_COUNT: u32 = 12;

/// Classic 9-slot payout table (index 0 = leftmost slot)
pub const CLASSIC_MULTIPLIERS: [f64; 9] = [0.2, 0.5, 1.0, 1.5, 2.0, 1.5, 1.0, 0.5, 0.2];

/// Low risk 11-slot payout table
pub const LOW_RISK_MULTIPLIERS: [f64; 11] =
    [100.0, 50.0, 10.0, 1.0, 0.8, 0.5, 0.8, 1.0, 10.0, 50.0, 100.0];

/// Medium risk 11-slot payout table
pub const MEDIUM_RISK_MULTIPLIERS: [f64; 11] =
    [200.0, 150.0, 25.0, 1.0, 0.5, 0.3, 0.5, 1.0, 25.0, 150.0, 200.0];

/// High risk 11-slot payout table
pub const HIGH_RISK_MULTIPLIERS: [f64; 11] =
    [1000.0, 200.0, 10.0, 0.5, 0.3, 0.1, 0.3, 0.5, 10.0, 200.0, 1000.0];

/// Column width of one 9-slot bucket: 3/2 = 1.5 columns per slot
pub const CLASSIC_BUCKET: (u32, u32) = (3, 2);

/// Column width of one 11-slot bucket: 6/5 = 1.2 columns per slot.
/// floor(12 / 1.2) = 10 keeps the outermost 11-slot entries reachable.
pub const WIDE_BUCKET: (u32, u32) = (6, 5);
