pub mod commands {
    pub const INIT: &str = "JB101";
    pub const STATUS: &str = "JB102";
    pub const RESTORE: &str = "JB103";
    pub const ARGS: &str = "JB104";
    pub const EXEC: &str = "JB105";
}
