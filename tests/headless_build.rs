//! `toolshell build` without a console.

#![cfg(unix)]

mod common;

use common::*;
use toolshell::headless::run_build;
use toolshell::toolchain::{BuildAction, BuildContext};

#[tokio::test]
async fn exit_code_follows_last_tool() {
    let ws = Workspace::new();
    let store = store_with(ws.toolchain("exit 5", "exit 0"));
    let context = BuildContext::new(Some(ws.root().to_path_buf()), Some(ws.file()));

    let code = run_build(store, context, BuildAction::Compile).await.unwrap();
    assert_eq!(code, 5);
    assert!(ws.root().join("out").join("foo.c").is_dir());
}

#[tokio::test]
async fn successful_compile_exits_zero() {
    let ws = Workspace::new();
    let store = store_with(ws.toolchain("echo compiled", "exit 0"));
    let context = BuildContext::new(Some(ws.root().to_path_buf()), Some(ws.file()));

    let code = run_build(store, context, BuildAction::Compile).await.unwrap();
    assert_eq!(code, 0);
}

#[tokio::test]
async fn precondition_failure_is_an_error() {
    let ws = Workspace::new();
    let store = store_with(ws.toolchain("exit 0", "exit 0"));

    let err = run_build(store, BuildContext::default(), BuildAction::Compile)
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("No file is open"));
}
