pub mod department;
pub mod employee;
pub mod kpi;
pub mod kpi_value;
pub mod period;
pub mod report;
pub mod settings;
