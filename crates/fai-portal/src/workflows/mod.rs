pub mod fai;
