pub mod v2022_09_01;
