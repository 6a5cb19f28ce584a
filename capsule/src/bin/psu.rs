//! Interactive two-machine PSU demo.
//!
//! Run the receiver first: it binds the TCP port and waits. Then run the
//! sender against the same IP. Both processes must see the same `psu.pp`
//! and `psu.testcase` files (generated on first run); copy them to the
//! second machine if the parties are not sharing a directory.

use barnacle::{AesRng, SyncChannel};
use capsule::{psu, testcase::TestCase, Error};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;

const PORT: u16 = 8080;
const PP_FILE: &str = "psu.pp";
const TESTCASE_FILE: &str = "psu.testcase";
const LOG_SENDER_SIZE: usize = 10;
const LOG_RECEIVER_SIZE: usize = 10;

type TcpChannel = SyncChannel<BufReader<TcpStream>, BufWriter<TcpStream>>;

fn prompt(question: &str) -> Result<String, Error> {
    print!("{}", question);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn load_or_create() -> Result<(psu::Params, TestCase), Error> {
    let mut rng = AesRng::new();
    let params = if Path::new(PP_FILE).exists() {
        println!("{} already exists", PP_FILE);
        psu::Params::fetch(PP_FILE)?
    } else {
        println!("{} does not exist, generating", PP_FILE);
        let params = psu::Params::new(128, 40, LOG_SENDER_SIZE, LOG_RECEIVER_SIZE, &mut rng);
        params.save(PP_FILE)?;
        params
    };
    let tc = if Path::new(TESTCASE_FILE).exists() {
        println!("{} already exists", TESTCASE_FILE);
        TestCase::load(TESTCASE_FILE)?
    } else {
        println!("{} does not exist, generating", TESTCASE_FILE);
        let tc = TestCase::gen(LOG_SENDER_SIZE, LOG_RECEIVER_SIZE, &mut rng);
        tc.save(TESTCASE_FILE)?;
        tc
    };
    if tc.log_sender_size != LOG_SENDER_SIZE {
        return Err(Error::SerializationError(
            "test case and public parameters do not match".to_string(),
        ));
    }
    Ok((params, tc))
}

fn channel_from(stream: TcpStream) -> Result<TcpChannel, Error> {
    let reader = BufReader::new(stream.try_clone()?);
    Ok(SyncChannel::new(reader, BufWriter::new(stream)))
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let (params, tc) = load_or_create()?;
    println!(
        "PSU test case: |X| = {}, |Y| = {}, expected |X ∪ Y| = {}",
        tc.sender_size, tc.receiver_size, tc.union_size
    );

    let party =
        prompt("select your role between sender and receiver (hint: first start receiver) ==> ")?;
    let ip = prompt("give IP to bind/connect to ==> ")?;
    let mut rng = AesRng::new();

    match party.as_str() {
        "sender" => {
            let stream = TcpStream::connect((ip.as_str(), PORT))?;
            let mut channel = channel_from(stream)?;
            let mut psu = psu::Sender::new(params);
            psu.send(&tc.sender_set, &mut channel, &mut rng)?;
            println!(
                "PSU sender finished, total communication {} bytes",
                channel.total_bytes()
            );
        }
        "receiver" => {
            let listener = TcpListener::bind((ip.as_str(), PORT))?;
            let (stream, peer) = listener.accept()?;
            println!("connection from {}", peer);
            let mut channel = channel_from(stream)?;
            let mut psu = psu::Receiver::new(params);
            let mut union = psu.receive(&tc.receiver_set, &mut channel, &mut rng)?;
            union.sort();
            let mut expected = tc.union.clone();
            expected.sort();
            if union != expected {
                eprintln!(
                    "PSU FAILED: got {} elements, expected {}",
                    union.len(),
                    expected.len()
                );
                std::process::exit(1);
            }
            println!(
                "PSU succeeds: union of size {} matches, total communication {} bytes",
                union.len(),
                channel.total_bytes()
            );
        }
        other => {
            eprintln!(
                "unknown role {:?}, expected \"sender\" or \"receiver\"",
                other
            );
            std::process::exit(1);
        }
    }
    Ok(())
}
