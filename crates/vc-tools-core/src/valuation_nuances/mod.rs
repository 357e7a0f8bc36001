pub mod convertible_note;
pub mod cumulative_dividends;
pub mod multi_round;
pub mod option_pool;
pub mod options_pricing;
pub mod participating_preferred;
pub mod vc_method;
