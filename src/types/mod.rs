pub mod anomaly;
pub mod anomaly_report;
pub mod date_range;
pub mod forecast;
pub mod observation;
