mod common;

mod completeness;
