pub mod anti_dilution;
pub mod deal;
pub mod liquidation;
