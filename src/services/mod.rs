pub mod bill_repository;
pub mod bill_service;
pub mod catalog_service;
pub mod party_service;
pub mod report_service;
