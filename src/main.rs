use bitio::{BitReader, BitWriter};

use log::debug;
use thiserror::Error;

use std::env;
use std::fs::File;
use std::io::{self, stdin, stdout, Read, Write};

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

const BITIO_CHUNK_SIZE: &str = "BITIO_CHUNK_SIZE";

const DEFAULT_CHUNK_SIZE: usize = 4096;

#[derive(Clone, Debug, Error)]
#[error("invalid value in {}; must be a positive integer", BITIO_CHUNK_SIZE)]
struct BadConfiguration;

fn chunk_size() -> Result<usize, BadConfiguration> {
    match env::var(BITIO_CHUNK_SIZE) {
        Ok(value) => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(BadConfiguration),
        },
        Err(_) => Ok(DEFAULT_CHUNK_SIZE),
    }
}

/// Renders every bit of `input` as ASCII `0` or `1`. Bits are grouped by
/// byte, eight bytes per line.
fn dump<R: Read>(input: R, chunk_size: usize) -> io::Result<String> {
    let mut reader = BitReader::new(input, chunk_size);
    let mut text = String::new();
    let mut count = 0;

    loop {
        match reader.read_bit() {
            Ok(bit) => text.push(if bit { '1' } else { '0' }),
            Err(e) if e.is_end_of_stream() => break,
            Err(e) => return Err(e.into()),
        }

        count += 1;
        if count % 64 == 0 {
            text.push('\n');
        } else if count % 8 == 0 {
            text.push(' ');
        }
    }

    if text.ends_with(' ') {
        text.pop();
        text.push('\n');
    }
    debug!("dump: read {} bits", count);
    Ok(text)
}

/// Packs ASCII `0` and `1` from `text` into bytes written to `output`.
/// Whitespace is skipped, and the last chunk is padded with 0 bits.
fn pack<W: Write>(text: &[u8], output: W, chunk_size: usize) -> io::Result<usize> {
    let mut writer = BitWriter::new(output, chunk_size);
    let mut count = 0;
    let mut written = 0;

    for (pos, &c) in text.iter().enumerate() {
        let bit = match c {
            b'0' => false,
            b'1' => true,
            c if c.is_ascii_whitespace() => continue,
            c => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("pack: unexpected byte {:#04x} at offset {}", c, pos),
                ))
            }
        };
        written += writer.write_bit(bit)?;
        count += 1;
    }
    written += writer.commit_pending()?;

    debug!("pack: packed {} bits into {} bits of output", count, written);
    Ok(written)
}

fn print_usage() {
    eprintln!("usage: bitio <mode> <file>");
    eprintln!("       where <mode> is either `d` to dump bits or `p` to pack bits");
    eprintln!("         and <file> is either `-` for stdin or filename");
    eprintln!("       {} sets the chunk size in bytes", BITIO_CHUNK_SIZE);
    std::process::exit(1);
}

fn main() -> io::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        print_usage();
    }

    let mode = &args[1];
    let file_name = &args[2];
    let chunk_size = chunk_size().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    debug!("main: chunk size is {} bytes", chunk_size);

    let mut input: Box<dyn Read> = if file_name == "-" {
        Box::new(stdin())
    } else {
        Box::new(File::open(file_name)?)
    };

    let stdout = stdout();
    let mut out = stdout.lock();
    if mode == "d" {
        let text = dump(input, chunk_size)?;
        out.write_all(text.as_bytes())?;
    } else if mode == "p" {
        let mut text = vec![];
        input.read_to_end(&mut text)?;
        pack(&text, &mut out, chunk_size)?;
    } else {
        print_usage();
    }
    out.flush()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dump_layout() {
        let data = [0xA5u8; 9];
        let text = dump(&data[..], 4).unwrap();
        let byte = "10100101";
        let line = vec![byte; 8].join(" ");
        assert_eq!(text, format!("{}\n{}\n", line, byte));
    }

    #[test]
    fn test_pack_pads_last_chunk() {
        let mut out: Vec<u8> = vec![];
        let written = pack(b"1111 1111\n1111", &mut out, 2).unwrap();
        assert_eq!(written, 16);
        assert_eq!(out, [0xFF, 0xF0]);
    }

    #[test]
    fn test_pack_rejects_garbage() {
        let err = pack(b"0102", io::sink(), 1).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[quickcheck]
    fn test_dump_pack_identity(bytes: Vec<u8>, chunk_size: u8) -> bool {
        let text = dump(&bytes[..], chunk_size as usize % 32 + 1).unwrap();
        let mut packed: Vec<u8> = vec![];
        pack(text.as_bytes(), &mut packed, 1).unwrap();
        bytes == packed
    }
}
