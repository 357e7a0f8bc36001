pub mod fund_fees;
pub mod j_curve;
pub mod term_sheet;
pub mod valuation_nuances;
