pub mod storcli;
