use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use fake_ftp_server::auth::UserAccount;
use fake_ftp_server::commands::invocation::{FILE_CONTENTS_KEY, PATHNAME_KEY, USERNAME_KEY};
use fake_ftp_server::commands::login::UserCommandHandler;
use fake_ftp_server::commands::transfer::{RetrCommandHandler, StorCommandHandler};
use fake_ftp_server::server::{RunningServer, Server};
use fake_ftp_server::storage::{FileEntry, InMemoryFileSystem};

// Helper to build a server with one account (joe/secret) on an ephemeral
// port and start it.
fn start_test_server() -> RunningServer {
    new_test_server().start().unwrap()
}

fn new_test_server() -> Server {
    let file_system = InMemoryFileSystem::new();
    file_system.add(FileEntry::directory("/home/joe"));

    let mut server = Server::new();
    server.set_file_system(Arc::new(file_system));
    server.add_user_account(UserAccount::new("joe", "secret", "/home/joe"));
    server.set_control_port(0);
    server
}

// Helper to connect to the control port and consume the greeting.
fn connect(server: &RunningServer) -> BufReader<TcpStream> {
    let stream = TcpStream::connect(server.local_addr()).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut reader = BufReader::new(stream);
    let greeting = read_reply(&mut reader);
    assert!(greeting.starts_with("220 "), "greeting was {:?}", greeting);
    reader
}

// Helper to send a command and read the next reply line.
fn send_command(reader: &mut BufReader<TcpStream>, command: &str) -> String {
    reader
        .get_mut()
        .write_all(format!("{}\r\n", command).as_bytes())
        .unwrap();
    reader.get_mut().flush().unwrap();
    read_reply(reader)
}

fn read_reply(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    line.trim_end().to_string()
}

fn login(reader: &mut BufReader<TcpStream>) {
    assert_eq!(send_command(reader, "USER joe"), "331 User name okay, need password.");
    assert_eq!(send_command(reader, "PASS secret"), "230 User logged in, proceed.");
}

// Extracts the data port from a `227 Entering passive mode (h1,h2,h3,h4,p1,p2).` reply.
fn passive_port(reply: &str) -> u16 {
    let start = reply.find('(').unwrap() + 1;
    let end = reply.find(')').unwrap();
    let fields: Vec<u16> = reply[start..end]
        .split(',')
        .map(|f| f.parse().unwrap())
        .collect();
    assert_eq!(fields.len(), 6, "unexpected PASV reply {:?}", reply);
    fields[4] * 256 + fields[5]
}

#[test]
fn test_greeting_noop_and_quit() {
    let server = start_test_server();
    let mut control = connect(&server);

    assert_eq!(send_command(&mut control, "NOOP"), "200 Command okay.");
    assert_eq!(send_command(&mut control, "NOOP"), "200 Command okay.");
    assert_eq!(
        send_command(&mut control, "QUIT"),
        "221 Service closing control connection."
    );
    server.stop();
}

#[test]
fn test_login_flow() {
    let server = start_test_server();
    let mut control = connect(&server);

    let reply = send_command(&mut control, "USER joe");
    assert!(reply.starts_with("331 "), "reply was {:?}", reply);

    let reply = send_command(&mut control, "PASS wrong");
    assert!(reply.starts_with("530 "), "reply was {:?}", reply);

    send_command(&mut control, "USER joe");
    let reply = send_command(&mut control, "PASS secret");
    assert!(reply.starts_with("230 "), "reply was {:?}", reply);

    assert_eq!(
        send_command(&mut control, "PWD"),
        "257 \"/home/joe\" is current directory."
    );
    assert_eq!(send_command(&mut control, "SYST"), "215 \"UNIX\" system type.");
    server.stop();
}

#[test]
fn test_login_with_unknown_user() {
    let server = start_test_server();
    let mut control = connect(&server);

    send_command(&mut control, "USER nobody");
    let reply = send_command(&mut control, "PASS pw");
    assert_eq!(reply, "530 UserAccount missing or invalid for user [nobody].");
    server.stop();
}

#[test]
fn test_bad_sequence_and_unknown_commands() {
    let server = start_test_server();
    let mut control = connect(&server);

    // PASS before USER.
    let reply = send_command(&mut control, "PASS secret");
    assert_eq!(reply, "503 Bad sequence of commands.");

    // PWD before login (no current directory yet).
    let reply = send_command(&mut control, "PWD");
    assert_eq!(reply, "503 Bad sequence of commands.");

    let reply = send_command(&mut control, "BOGUS");
    assert_eq!(reply, "502 Command not implemented.");

    // Commands needing login are refused before it.
    let reply = send_command(&mut control, "PASV");
    assert_eq!(reply, "530 Not logged in.");
    server.stop();
}

#[test]
fn test_stor_then_retr_over_passive_data_connections() {
    let mut server = new_test_server();

    let stor = Arc::new(StorCommandHandler::new());
    server.set_command_handler("STOR", stor.clone());
    let retr = Arc::new(RetrCommandHandler::new());
    retr.set_file_contents("hello world");
    server.set_command_handler("RETR", retr.clone());

    let server = server.start().unwrap();
    let mut control = connect(&server);
    login(&mut control);

    // Upload over a passive data connection.
    let reply = send_command(&mut control, "PASV");
    assert!(reply.starts_with("227 "), "reply was {:?}", reply);
    let port = passive_port(&reply);

    let mut data = TcpStream::connect(("127.0.0.1", port)).unwrap();
    control
        .get_mut()
        .write_all(b"STOR upload.bin\r\n")
        .unwrap();
    data.write_all(&[0x61, 0x62, 0x63]).unwrap();
    data.shutdown(Shutdown::Write).unwrap();

    assert!(read_reply(&mut control).starts_with("150 "));
    assert!(read_reply(&mut control).starts_with("226 "));

    let record = stor.invocations().get(0).unwrap();
    assert_eq!(record.text(PATHNAME_KEY), Some("upload.bin"));
    assert_eq!(record.bytes(FILE_CONTENTS_KEY), Some(&b"abc"[..]));

    // Download over a fresh passive data connection.
    let reply = send_command(&mut control, "PASV");
    let port = passive_port(&reply);
    let mut data = TcpStream::connect(("127.0.0.1", port)).unwrap();
    control.get_mut().write_all(b"RETR served.txt\r\n").unwrap();

    let mut contents = Vec::new();
    data.read_to_end(&mut contents).unwrap();
    assert_eq!(contents, b"hello world");

    assert!(read_reply(&mut control).starts_with("150 "));
    assert!(read_reply(&mut control).starts_with("226 "));
    assert_eq!(
        retr.invocations().get(0).unwrap().text(PATHNAME_KEY),
        Some("served.txt")
    );

    server.stop();
}

#[test]
fn test_retr_over_active_data_connection() {
    let mut server = new_test_server();

    let retr = Arc::new(RetrCommandHandler::new());
    retr.set_file_contents(vec![0x00, 0xff, 0x10]);
    server.set_command_handler("RETR", retr.clone());

    let server = server.start().unwrap();
    let mut control = connect(&server);
    login(&mut control);

    // Advertise a local listener via PORT, then retrieve.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let command = format!("PORT 127,0,0,1,{},{}", port >> 8, port & 0xff);
    assert_eq!(send_command(&mut control, &command), "200 Command okay.");

    control.get_mut().write_all(b"RETR blob.bin\r\n").unwrap();

    let (mut data, _) = listener.accept().unwrap();
    let mut contents = Vec::new();
    data.read_to_end(&mut contents).unwrap();
    assert_eq!(contents, &[0x00, 0xff, 0x10]);

    assert!(read_reply(&mut control).starts_with("150 "));
    assert!(read_reply(&mut control).starts_with("226 "));

    server.stop();
}

#[test]
fn test_invocation_records_survive_stop() {
    let mut server = new_test_server();
    let user = Arc::new(UserCommandHandler::new());
    server.set_command_handler("USER", user.clone());

    let server = server.start().unwrap();
    let mut control = connect(&server);
    send_command(&mut control, "USER joe");
    send_command(&mut control, "QUIT");
    server.stop();

    assert_eq!(user.invocations().len(), 1);
    assert_eq!(
        user.invocations().get(0).unwrap().text(USERNAME_KEY),
        Some("joe")
    );
}

#[test]
fn test_help_and_static_handlers() {
    let mut server = new_test_server();
    server.set_help_text("", "Supported commands: USER PASS RETR STOR QUIT");
    let server = server.start().unwrap();
    let mut control = connect(&server);

    assert_eq!(
        send_command(&mut control, "HELP"),
        "214 Supported commands: USER PASS RETR STOR QUIT"
    );
    assert_eq!(
        send_command(&mut control, "HELP NLST"),
        "214 No help text defined for [NLST]."
    );
    assert_eq!(
        send_command(&mut control, "DELE old.txt"),
        "250 Requested file action okay, completed."
    );
    assert_eq!(
        send_command(&mut control, "REIN"),
        "220 Service ready for new user."
    );
    server.stop();
}
