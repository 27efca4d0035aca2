pub mod import_service;
pub mod operation_service;
pub mod quantity_service;
pub mod valuation_service;
