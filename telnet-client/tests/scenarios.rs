//! End-to-end scenarios (S1-S6) driving the public facade with a scripted
//! byte source, no real socket involved.

use std::time::Duration;

use telnet_client::test_support::ScriptedByteSource;
use telnet_client::{ClientConfig, TelnetClient};

/// Build a client with `prompt_regex` compiled as a *regular expression*
/// (not a literal - see [`ClientConfig::set_regex_prompt`]). `ClientConfig::new`
/// treats its `prompt` argument as a literal to be escaped, so construction
/// starts with an empty placeholder prompt and `set_regex_prompt` installs
/// the intended pattern afterwards.
fn client(prompt_regex: &str) -> TelnetClient {
    let config = ClientConfig::new(
        "example.invalid",
        23,
        Duration::from_secs(1),
        Some(Duration::from_millis(200)),
        "",
        Some(Duration::from_millis(200)),
    )
    .unwrap();
    let mut client = TelnetClient::from_config(config);
    client.set_regex_prompt(prompt_regex).unwrap();
    client
}

/// S1 - Option rejection.
#[test]
fn s1_option_rejection() {
    let mut client = client(r"\$\s*$");
    let script = [0xFFu8, 0xFB, 0x01, 0xFF, 0xFD, 0x03]
        .into_iter()
        .chain(*b"$ ")
        .collect::<Vec<u8>>();
    client.attach_scripted_source(ScriptedByteSource::new(script));

    let lines = client.wait_prompt(false).unwrap();
    let last = lines.last().unwrap();
    assert_eq!(&last[..], b"$ ");
}

/// S2 - IAC escape in data.
#[test]
fn s2_iac_in_data() {
    let mut client = client(r"\$\s*$");
    let mut script = vec![b'A', 0xFF, 0xFF, b'B'];
    script.extend_from_slice(b"\r\n$ ");
    client.attach_scripted_source(ScriptedByteSource::new(script));

    let lines = client.wait_prompt(false).unwrap();
    assert_eq!(&lines[0][..], [b'A', 0xFF, b'B']);
    assert_eq!(&lines[1][..], b"$ ");
}

/// S3 - CR without LF is kept, then the line ends normally.
#[test]
fn s3_cr_without_lf() {
    let mut client = client(r"\$\s*$");
    client.attach_scripted_source(ScriptedByteSource::new(b"X\rY\n$ ".to_vec()));

    let (line, _) = client.get_line(true).unwrap();
    assert_eq!(&line[..], b"X\rY\n");
}

/// S4 - Subnegotiation is consumed and discarded.
#[test]
fn s4_subnegotiation_drop() {
    let mut client = client(r"\$\s*$");
    let mut script = vec![0xFFu8, 0xFA, 0x18, 0x00];
    script.extend_from_slice(b"xterm");
    script.extend_from_slice(&[0xFF, 0xF0]);
    script.extend_from_slice(b"ok\n$ ");
    client.attach_scripted_source(ScriptedByteSource::new(script));

    let lines = client.wait_prompt(false).unwrap();
    assert_eq!(&lines[0][..], b"ok");
    assert_eq!(&lines[1][..], b"$ ");
}

/// S5 - ANSI stripping via prune_control_sequences.
#[test]
fn s5_ansi_stripping() {
    let mut client = client(r"\$\s*$");
    client.set_prune_control_sequences(true);
    let mut script = b"hi\x1B[31mRED\x1B[0m bye".to_vec();
    script.extend_from_slice(b"\n$ ");
    client.attach_scripted_source(ScriptedByteSource::new(script));

    let (line, _) = client.get_line(true).unwrap();
    // text_only projection has already stripped the escape/control bytes.
    assert_eq!(&line[..], b"hiRED bye\n");
}

/// S6 - Full-line timeout returns a partial line after ~50ms.
#[test]
fn s6_full_line_timeout() {
    let mut client = client(r"\$\s*$");
    client.set_socket_timeout(Some(Duration::from_secs(1)));
    client.set_full_line_timeout(Some(Duration::from_millis(50)));
    client.attach_scripted_source(ScriptedByteSource::new(b"abc".to_vec()));

    let started = std::time::Instant::now();
    let (line, matches_prompt) = client.get_line(true).unwrap();
    assert_eq!(&line[..], b"abc");
    assert!(!matches_prompt);
    assert!(started.elapsed() >= Duration::from_millis(45));
}

#[test]
fn exec_sends_command_and_returns_lines() {
    let mut client = client(r"\$\s*$");
    let mut script = Vec::new();
    script.extend_from_slice(b"line one\r\n");
    script.extend_from_slice(b"line two\r\n");
    script.extend_from_slice(b"$ ");
    client.attach_scripted_source(ScriptedByteSource::new(script));

    let lines = client.exec("show version", true).unwrap();
    assert_eq!(&lines[0][..], b"line one");
    assert_eq!(&lines[1][..], b"line two");
    assert_eq!(&lines[2][..], b"$ ");
}

#[test]
fn login_writes_username_then_password_and_restores_prompt() {
    let mut client = client(r"\$\s*$");
    let mut script = Vec::new();
    script.extend_from_slice(b"login: ");
    script.extend_from_slice(b"Password: ");
    script.extend_from_slice(b"welcome\r\n$ ");
    client.attach_scripted_source(ScriptedByteSource::new(script));

    client
        .login("alice", "hunter2", Some("login: $"), Some("Password: $"))
        .unwrap();

    assert!(client.prompt().is_match("some $"));
}
