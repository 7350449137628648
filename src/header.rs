//! Record layouts for the local file header, the central directory file
//! header and the end-of-central-directory trailer.

use crate::encoding::{put_u16, put_u32};

pub const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x04034B50;
pub const CENTRAL_DIRECTORY_HEADER_SIGNATURE: u32 = 0x02014B50;
pub const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x06054B50;

/// Version made by / needed to extract (1.0)
pub const VERSION: u16 = 10;
pub const GENERAL_PURPOSE_FLAG: u16 = 0;

/// Fixed part of a local file header, up to and including the extra field length
pub const LOCAL_FILE_HEADER_LEN: u64 = 30;
pub const CENTRAL_DIRECTORY_HEADER_LEN: u64 = 46;
pub const END_OF_CENTRAL_DIRECTORY_LEN: u64 = 22;

/// Number of filler bytes needed so that entry data starting after a local
/// header at `header_offset` lands on a multiple of `alignment`.
///
/// An alignment of 0 or 1 never pads.
pub fn alignment_padding(
    header_offset: u64,
    name_len: usize,
    extra_field_len: usize,
    alignment: u32,
) -> usize {
    if alignment <= 1 {
        return 0;
    }
    let data_offset =
        header_offset + LOCAL_FILE_HEADER_LEN + name_len as u64 + extra_field_len as u64;
    let delta = data_offset % alignment as u64;
    if delta == 0 {
        0
    } else {
        (alignment as u64 - delta) as usize
    }
}

/// Fields shared by the local and central directory headers
#[derive(Debug, Clone, Copy)]
pub struct EntryFields<'a> {
    pub method: u16,
    pub modification_time: u32,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name: &'a [u8],
    pub extra_field: &'a [u8],
}

/// Local file header. `padding` zero bytes are appended to the extra field
/// and counted in its declared length.
#[derive(Debug, Clone, Copy)]
pub struct LocalFileHeader<'a> {
    pub fields: EntryFields<'a>,
    pub padding: usize,
}

impl LocalFileHeader<'_> {
    /// Serialized length including name, extra field and padding
    pub fn encoded_len(&self) -> u64 {
        LOCAL_FILE_HEADER_LEN
            + self.fields.name.len() as u64
            + self.fields.extra_field.len() as u64
            + self.padding as u64
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        let f = &self.fields;
        buf.reserve(self.encoded_len() as usize);
        put_u32(buf, LOCAL_FILE_HEADER_SIGNATURE);
        put_u16(buf, VERSION);
        put_u16(buf, GENERAL_PURPOSE_FLAG);
        put_u16(buf, f.method);
        put_u32(buf, f.modification_time);
        put_u32(buf, f.crc32);
        put_u32(buf, f.compressed_size);
        put_u32(buf, f.uncompressed_size);
        put_u16(buf, f.name.len() as u16);
        put_u16(buf, (f.extra_field.len() + self.padding) as u16);
        buf.extend_from_slice(f.name);
        buf.extend_from_slice(f.extra_field);
        buf.resize(buf.len() + self.padding, 0);
    }
}

/// Central directory file header. Carries the unpadded extra field.
#[derive(Debug, Clone, Copy)]
pub struct CentralDirectoryHeader<'a> {
    pub fields: EntryFields<'a>,
    pub comment: &'a [u8],
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader<'_> {
    pub fn encoded_len(&self) -> u64 {
        CENTRAL_DIRECTORY_HEADER_LEN
            + self.fields.name.len() as u64
            + self.fields.extra_field.len() as u64
            + self.comment.len() as u64
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        let f = &self.fields;
        buf.reserve(self.encoded_len() as usize);
        put_u32(buf, CENTRAL_DIRECTORY_HEADER_SIGNATURE);
        put_u16(buf, VERSION); // made by
        put_u16(buf, VERSION); // needed to extract
        put_u16(buf, GENERAL_PURPOSE_FLAG);
        put_u16(buf, f.method);
        put_u32(buf, f.modification_time);
        put_u32(buf, f.crc32);
        put_u32(buf, f.compressed_size);
        put_u32(buf, f.uncompressed_size);
        put_u16(buf, f.name.len() as u16);
        put_u16(buf, f.extra_field.len() as u16);
        put_u16(buf, self.comment.len() as u16);
        put_u16(buf, 0); // disk number start
        put_u16(buf, 0); // internal attrs
        put_u32(buf, 0); // external attrs
        put_u32(buf, self.local_header_offset);
        buf.extend_from_slice(f.name);
        buf.extend_from_slice(f.extra_field);
        buf.extend_from_slice(self.comment);
    }
}

/// End-of-central-directory record. Single-disk only, so the entry count is
/// written both as "on this disk" and "total".
#[derive(Debug, Clone, Copy)]
pub struct EndOfCentralDirectory<'a> {
    pub entries: u16,
    pub central_directory_size: u32,
    pub central_directory_offset: u32,
    pub comment: &'a [u8],
}

impl EndOfCentralDirectory<'_> {
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.reserve(END_OF_CENTRAL_DIRECTORY_LEN as usize + self.comment.len());
        put_u32(buf, END_OF_CENTRAL_DIRECTORY_SIGNATURE);
        put_u16(buf, 0); // number of this disk
        put_u16(buf, 0); // disk with central directory
        put_u16(buf, self.entries);
        put_u16(buf, self.entries);
        put_u32(buf, self.central_directory_size);
        put_u32(buf, self.central_directory_offset);
        put_u16(buf, self.comment.len() as u16);
        buf.extend_from_slice(self.comment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(name: &'a [u8], extra_field: &'a [u8]) -> EntryFields<'a> {
        EntryFields {
            method: 0,
            modification_time: 0x5A21_6C33,
            crc32: 0xDEAD_BEEF,
            compressed_size: 2,
            uncompressed_size: 2,
            name,
            extra_field,
        }
    }

    fn u16_at(buf: &[u8], pos: usize) -> u16 {
        u16::from_le_bytes([buf[pos], buf[pos + 1]])
    }

    fn u32_at(buf: &[u8], pos: usize) -> u32 {
        u32::from_le_bytes([buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]])
    }

    #[test]
    fn test_alignment_padding() {
        // data would start at 30 + 5 = 35
        assert_eq!(alignment_padding(0, 5, 0, 4), 1);
        assert_eq!(alignment_padding(1, 5, 0, 4), 0);
        assert_eq!(alignment_padding(0, 5, 9, 4096), 4096 - 44);
        assert_eq!(alignment_padding(0, 5, 0, 1), 0);
        assert_eq!(alignment_padding(0, 5, 0, 0), 0);
        assert_eq!(alignment_padding(100, 7, 3, 5), 0);
    }

    #[test]
    fn test_local_header_layout() {
        let header = LocalFileHeader {
            fields: fields(b"a.txt", &[0xFE, 0xCA, 0, 0]),
            padding: 3,
        };
        let mut buf = Vec::new();
        header.write_to(&mut buf);

        assert_eq!(buf.len() as u64, header.encoded_len());
        assert_eq!(buf.len(), 30 + 5 + 4 + 3);
        assert_eq!(&buf[0..4], &[0x50, 0x4B, 0x03, 0x04]);
        assert_eq!(u16_at(&buf, 4), 10);
        assert_eq!(u16_at(&buf, 6), 0);
        assert_eq!(u16_at(&buf, 8), 0);
        assert_eq!(u32_at(&buf, 10), 0x5A21_6C33);
        assert_eq!(u32_at(&buf, 14), 0xDEAD_BEEF);
        assert_eq!(u32_at(&buf, 18), 2);
        assert_eq!(u32_at(&buf, 22), 2);
        assert_eq!(u16_at(&buf, 26), 5);
        assert_eq!(u16_at(&buf, 28), 7);
        assert_eq!(&buf[30..35], b"a.txt");
        assert_eq!(&buf[35..39], &[0xFE, 0xCA, 0, 0]);
        assert_eq!(&buf[39..], &[0, 0, 0]);
    }

    #[test]
    fn test_central_directory_header_layout() {
        let header = CentralDirectoryHeader {
            fields: EntryFields {
                method: 8,
                ..fields(b"b.txt", &[1, 2])
            },
            comment: b"note",
            local_header_offset: 0x0102_0304,
        };
        let mut buf = Vec::new();
        header.write_to(&mut buf);

        assert_eq!(buf.len() as u64, header.encoded_len());
        assert_eq!(&buf[0..4], &[0x50, 0x4B, 0x01, 0x02]);
        assert_eq!(u16_at(&buf, 4), 10);
        assert_eq!(u16_at(&buf, 6), 10);
        assert_eq!(u16_at(&buf, 10), 8);
        assert_eq!(u16_at(&buf, 28), 5);
        assert_eq!(u16_at(&buf, 30), 2);
        assert_eq!(u16_at(&buf, 32), 4);
        assert_eq!(u16_at(&buf, 34), 0);
        assert_eq!(u16_at(&buf, 36), 0);
        assert_eq!(u32_at(&buf, 38), 0);
        assert_eq!(u32_at(&buf, 42), 0x0102_0304);
        assert_eq!(&buf[46..], b"b.txt\x01\x02note");
    }

    #[test]
    fn test_end_of_central_directory_layout() {
        let eocd = EndOfCentralDirectory {
            entries: 2,
            central_directory_size: 99,
            central_directory_offset: 1234,
            comment: b"hi",
        };
        let mut buf = Vec::new();
        eocd.write_to(&mut buf);

        assert_eq!(buf.len(), 24);
        assert_eq!(&buf[0..4], &[0x50, 0x4B, 0x05, 0x06]);
        assert_eq!(u16_at(&buf, 4), 0);
        assert_eq!(u16_at(&buf, 6), 0);
        assert_eq!(u16_at(&buf, 8), 2);
        assert_eq!(u16_at(&buf, 10), 2);
        assert_eq!(u32_at(&buf, 12), 99);
        assert_eq!(u32_at(&buf, 16), 1234);
        assert_eq!(u16_at(&buf, 20), 2);
        assert_eq!(&buf[22..], b"hi");
    }
}
