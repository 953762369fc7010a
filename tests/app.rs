// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

#![cfg(feature = "app")]

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use spectral::prelude::*;
use tempfile::NamedTempFile;

use domaintool::app::{self, AppConfig, ExitStatus};
use domaintool::RecordType;

mod common;

use common::{MockResolver, MockWhois};

fn config(args: &[&str]) -> AppConfig {
    let mut all = vec!["domaintool", "--no-color"];
    all.extend_from_slice(args);
    app::parse_args(all).expect("valid arguments")
}

fn domain_file(lines: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{}", lines).expect("write temp file");
    file
}

async fn run(app_config: &AppConfig, resolver: MockResolver) -> (ExitStatus, String, MockResolver) {
    let mut buf = Vec::new();
    app::setup_output(app_config);

    let status = app::run_with(
        app_config,
        |config| resolver.from_config(config),
        Arc::new(MockWhois::default()),
        &mut buf,
    )
    .await
    .expect("run succeeds");

    (status, String::from_utf8(buf).expect("utf8 output"), resolver)
}

#[tokio::test]
async fn file_with_existing_and_nonexistent_domain() {
    let file = domain_file("example.com\n\n  nonexistent-domain-xyz.invalid  \n");
    let path = file.path().to_string_lossy().to_string();
    let app_config = config(&["-f", &path, "-a", "-mx"]);
    let resolver = MockResolver::new().with_records("example.com", RecordType::A, &["93.184.216.34"]);

    let (status, out, _) = run(&app_config, resolver).await;

    assert_that(&status).is_equal_to(ExitStatus::Ok);
    let first = out.find("LOOKING UP example.com");
    let second = out.find("LOOKING UP nonexistent-domain-xyz.invalid");
    assert_that(&first).is_some();
    assert_that(&second).is_some();
    assert_that(&(first < second)).is_true();

    let (first_block, second_block) = out.split_at(second.unwrap());
    assert_that(&first_block).contains("A Records for example.com\n93.184.216.34\n");
    assert_that(&second_block).contains("No A Records found for (NXDOMAIN) nonexistent-domain-xyz.invalid");
    assert_that(&second_block).contains("MX Records not found for (NXDOMAIN) nonexistent-domain-xyz.invalid");
}

#[tokio::test]
async fn file_domains_come_before_positional_domains() {
    let file = domain_file("from-file.example\n");
    let path = file.path().to_string_lossy().to_string();
    let app_config = config(&["--ns", "positional.example", "-f", &path]);

    let (_, out, resolver) = run(&app_config, MockResolver::new()).await;

    let names: Vec<_> = resolver.calls().into_iter().map(|x| x.name).collect();
    assert_that(&names).has_length(2);
    assert_that(&names.contains(&"positional.example".to_string())).is_true();
    assert_that(&(out.find("LOOKING UP from-file.example") < out.find("LOOKING UP positional.example"))).is_true();
}

#[tokio::test]
async fn unreadable_file_sends_no_queries() {
    let app_config = config(&["-f", "/nonexistent/path/to/domains.txt", "-a", "example.com"]);

    let (status, out, resolver) = run(&app_config, MockResolver::new()).await;

    assert_that(&status).is_equal_to(ExitStatus::InvalidInput);
    assert_that(&resolver.configs()).is_empty();
    assert_that(&resolver.calls()).is_empty();
    assert_that(&out).is_equal_to(String::new());
}

#[tokio::test]
async fn custom_name_server_is_used_for_every_query() {
    let app_config = config(&["-d", "9.9.9.9", "-all", "example.com", "example.org"]);
    let expected: SocketAddr = "9.9.9.9:53".parse().unwrap();

    let (_, _, resolver) = run(&app_config, MockResolver::new()).await;

    let configs = resolver.configs();
    assert_that(&configs).has_length(1);
    assert_that(&configs[0].name_server).is_some().is_equal_to(&expected);
    let calls = resolver.calls();
    assert_that(&calls).has_length(12);
    for call in calls {
        assert_that(&call.name_servers).is_equal_to(vec![expected]);
    }
}

#[tokio::test]
async fn system_name_servers_without_custom_name_server() {
    let app_config = config(&["-a", "example.com"]);

    let (_, _, resolver) = run(&app_config, MockResolver::new()).await;

    assert_that(&resolver.configs()[0].name_server).is_none();
    assert_that(&resolver.calls()[0].name_servers).is_equal_to(vec!["127.0.0.53:53".parse::<SocketAddr>().unwrap()]);
}

#[tokio::test]
async fn no_record_flags_print_header_and_note() {
    let app_config = config(&["example.com"]);

    let (status, out, resolver) = run(&app_config, MockResolver::new()).await;

    assert_that(&status).is_equal_to(ExitStatus::Ok);
    assert_that(&resolver.calls()).is_empty();
    assert_that(&out).contains("LOOKING UP example.com");
    assert_that(&out).contains("No lookups selected for example.com");
}

#[tokio::test]
async fn reverse_lookup_after_domains() {
    let app_config = config(&["-a", "example.com", "-r", "93.184.216.34"]);
    let resolver = MockResolver::new().with_records("34.216.184.93.in-addr.arpa.", RecordType::PTR, &["example.com."]);

    let (_, out, _) = run(&app_config, resolver).await;

    let domain = out.find("LOOKING UP example.com");
    let ip = out.find("LOOKING UP IP - 93.184.216.34");
    assert_that(&(domain < ip)).is_true();
    assert_that(&out).contains("Reverse Lookup for 93.184.216.34:\nexample.com.\n");
}

#[tokio::test]
async fn reverse_lookup_of_garbage() {
    let app_config = config(&["-r", "not-an-ip"]);

    let (status, out, resolver) = run(&app_config, MockResolver::new()).await;

    assert_that(&status).is_equal_to(ExitStatus::Ok);
    assert_that(&resolver.calls()).is_empty();
    assert_that(&out).contains("Unexpected error during reverse lookup for not-an-ip");
}

#[tokio::test]
async fn lines_output() {
    let app_config = config(&["-o", "lines", "--txt", "example.com"]);
    let resolver = MockResolver::new().with_records("example.com", RecordType::TXT, &["v=spf1 -all"]);

    let (_, out, _) = run(&app_config, resolver).await;

    assert_that(&out).is_equal_to("example.com - TXT - v=spf1 -all\n".to_string());
}

#[tokio::test]
async fn json_output_has_one_report_per_line() {
    let app_config = config(&["-o", "json", "--dmarc", "a.example", "b.example"]);

    let (_, out, _) = run(&app_config, MockResolver::new()).await;

    let lines: Vec<_> = out.lines().collect();
    assert_that(&lines).has_length(2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json");
    assert_that(&first["domain"]).is_equal_to(serde_json::Value::from("a.example"));
}

#[test]
fn invalid_invocations_exit_with_one() {
    assert_that(&app::parse_args(vec!["domaintool", "-a"]).err()).is_equal_to(Some(ExitStatus::InvalidInput));
    assert_that(&app::parse_args(vec!["domaintool", "-f"]).err()).is_equal_to(Some(ExitStatus::InvalidInput));
    assert_that(&app::parse_args(vec!["domaintool", "-d", "dns.google", "example.com"]).err())
        .is_equal_to(Some(ExitStatus::InvalidInput));
}

#[test]
fn help_and_version_exit_with_zero() {
    assert_that(&app::parse_args(vec!["domaintool"]).err()).is_equal_to(Some(ExitStatus::Ok));
    assert_that(&app::parse_args(vec!["domaintool", "-h"]).err()).is_equal_to(Some(ExitStatus::Ok));
    assert_that(&app::parse_args(vec!["domaintool", "--version"]).err()).is_equal_to(Some(ExitStatus::Ok));
}
