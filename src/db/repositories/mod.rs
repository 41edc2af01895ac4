pub mod department_repository;
pub mod employee_repository;
pub mod kpi_repository;
pub mod kpi_value_repository;
pub mod period_repository;
