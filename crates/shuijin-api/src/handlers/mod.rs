//! HTTP request handlers for the shuijin API

pub mod gateway;
