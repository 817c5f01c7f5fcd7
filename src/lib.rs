// src/lib.rs

//! Library Management Console Library

pub mod commands;
pub mod error;
pub mod models;
pub mod policy;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;
pub mod validation;
