pub mod completed_rounds;
