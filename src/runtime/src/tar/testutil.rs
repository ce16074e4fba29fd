//! Hand-built archives for decoder tests.

use super::header::BLOCK_SIZE;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Magic {
    V7,
    Ustar,
    Gnu,
}

#[derive(Clone)]
pub struct HeaderSpec {
    pub name: String,
    pub mode: u32,
    pub uid: u64,
    pub gid: u64,
    pub size: u64,
    pub mtime: i64,
    pub type_flag: u8,
    pub link_name: String,
    pub uname: String,
    pub gname: String,
    pub dev_major: u32,
    pub dev_minor: u32,
    pub magic: Magic,
}

impl HeaderSpec {
    pub fn file(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            mode: 0o644,
            uid: 1000,
            gid: 1000,
            size,
            mtime: 1_700_000_000,
            type_flag: b'0',
            link_name: String::new(),
            uname: "user".to_string(),
            gname: "group".to_string(),
            dev_major: 0,
            dev_minor: 0,
            magic: Magic::Ustar,
        }
    }

    pub fn typed(name: &str, type_flag: u8) -> Self {
        Self {
            type_flag,
            ..Self::file(name, 0)
        }
    }

    /// Encode into a block with a valid checksum.
    pub fn block(&self) -> [u8; BLOCK_SIZE] {
        let mut b = [0u8; BLOCK_SIZE];
        put(&mut b, 0, self.name.as_bytes(), 100);
        put(&mut b, 100, format!("{:07o}\0", self.mode).as_bytes(), 8);
        put(&mut b, 108, format!("{:07o}\0", self.uid).as_bytes(), 8);
        put(&mut b, 116, format!("{:07o}\0", self.gid).as_bytes(), 8);
        put_number12(&mut b, 124, self.size);
        put(&mut b, 136, format!("{:011o}\0", self.mtime).as_bytes(), 12);
        b[156] = self.type_flag;
        put(&mut b, 157, self.link_name.as_bytes(), 100);
        match self.magic {
            Magic::V7 => {}
            Magic::Ustar => {
                put(&mut b, 257, b"ustar\0", 6);
                put(&mut b, 263, b"00", 2);
            }
            Magic::Gnu => {
                put(&mut b, 257, b"ustar ", 6);
                put(&mut b, 263, b" \0", 2);
            }
        }
        if self.magic != Magic::V7 {
            put(&mut b, 265, self.uname.as_bytes(), 32);
            put(&mut b, 297, self.gname.as_bytes(), 32);
            put(&mut b, 329, format!("{:07o}\0", self.dev_major).as_bytes(), 8);
            put(&mut b, 337, format!("{:07o}\0", self.dev_minor).as_bytes(), 8);
        }
        seal(&mut b);
        b
    }
}

fn put(block: &mut [u8; BLOCK_SIZE], at: usize, value: &[u8], width: usize) {
    assert!(value.len() <= width, "field overflow at {at}");
    block[at..at + value.len()].copy_from_slice(value);
}

/// Octal when it fits in 11 digits, GNU base-256 otherwise.
fn put_number12(block: &mut [u8; BLOCK_SIZE], at: usize, value: u64) {
    if value < 0o77777777777 {
        put(block, at, format!("{:011o}\0", value).as_bytes(), 12);
    } else {
        block[at] = 0x80;
        block[at + 4..at + 12].copy_from_slice(&value.to_be_bytes());
    }
}

/// Recompute the checksum field in place.
pub fn seal(block: &mut [u8; BLOCK_SIZE]) {
    block[148..156].copy_from_slice(b"        ");
    let sum: u32 = block.iter().map(|&b| u32::from(b)).sum();
    block[148..156].copy_from_slice(format!("{:06o}\0 ", sum).as_bytes());
}

/// One `"<len> key=value\n"` record.
pub fn pax_record(key: &str, value: &str) -> Vec<u8> {
    let body = format!(" {}={}\n", key, value);
    let mut len = body.len() + 1;
    while len.to_string().len() + body.len() != len {
        len += 1;
    }
    format!("{}{}", len, body).into_bytes()
}

/// Archive byte stream assembled block by block.
#[derive(Default)]
pub struct RawArchive {
    bytes: Vec<u8>,
}

impl RawArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&mut self, block: [u8; BLOCK_SIZE]) -> &mut Self {
        self.bytes.extend_from_slice(&block);
        self
    }

    /// Payload bytes padded to a block boundary.
    pub fn payload(&mut self, data: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(data);
        let pad = (BLOCK_SIZE - data.len() % BLOCK_SIZE) % BLOCK_SIZE;
        self.bytes.extend(std::iter::repeat(0u8).take(pad));
        self
    }

    pub fn entry(&mut self, spec: &HeaderSpec, data: &[u8]) -> &mut Self {
        self.block(spec.block());
        self.payload(data)
    }

    pub fn file(&mut self, name: &str, data: &[u8]) -> &mut Self {
        self.entry(&HeaderSpec::file(name, data.len() as u64), data)
    }

    /// A PAX `x` (or `g` when `global`) header carrying `records`.
    pub fn pax(&mut self, records: &[(&str, &str)], global: bool) -> &mut Self {
        let payload: Vec<u8> = records
            .iter()
            .flat_map(|(k, v)| pax_record(k, v))
            .collect();
        let mut spec = HeaderSpec::file("././@PaxHeader", payload.len() as u64);
        spec.type_flag = if global { b'g' } else { b'x' };
        self.entry(&spec, &payload)
    }

    /// A GNU `L` or `K` record.
    pub fn gnu_long(&mut self, type_flag: u8, name: &str) -> &mut Self {
        let mut payload = name.as_bytes().to_vec();
        payload.push(0);
        let mut spec = HeaderSpec::file("././@LongLink", payload.len() as u64);
        spec.type_flag = type_flag;
        spec.magic = Magic::Gnu;
        self.entry(&spec, &payload)
    }

    /// Bytes with the two-block end-of-archive marker.
    pub fn finish(&self) -> Vec<u8> {
        let mut bytes = self.bytes.clone();
        bytes.extend_from_slice(&[0u8; 2 * BLOCK_SIZE]);
        bytes
    }

    /// Bytes without any end-of-archive marker.
    pub fn unterminated(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}
