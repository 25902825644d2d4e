pub mod graph;
pub mod cust_error;
pub mod cover;
pub mod heuristics;
pub mod edge_scan;
pub mod max_degree;
pub mod benchmark;
