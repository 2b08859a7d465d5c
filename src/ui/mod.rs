//! 交互层入口。

pub mod web;
