pub mod v2024_05_01;
