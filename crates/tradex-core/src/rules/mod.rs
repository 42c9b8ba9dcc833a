//! Field recognition rules shared by the column mapper and the text extractors.

pub mod amounts;
pub mod dates;
pub mod keywords;
pub mod patterns;
pub mod times;

pub use amounts::{extract_result_amount, extract_risk, extract_risk_reward, parse_number};
pub use dates::{coerce_date, extract_date, format_date, parse_date_generic};
pub use keywords::{
    extract_direction, extract_pair, extract_result, extract_setup, infer_direction_cell,
    infer_result_cell,
};
pub use times::{decode_time, extract_entry_time, extract_exit_time, fraction_to_hhmm};
