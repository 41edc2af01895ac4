pub mod department_hierarchy;
pub mod kpi_value_service;
pub mod reference_service;
pub mod report_service;
pub mod score_calculator;
pub mod scorecard_source;
pub mod settings_service;
pub mod summary_reporter;
pub mod weighted_aggregator;
