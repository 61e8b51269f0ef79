pub mod v2023_07_01;
