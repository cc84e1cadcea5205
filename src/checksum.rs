use std::fmt;

/// Polynomial used by the game's CRC flavor. It is fed to the LSB-first
/// shift loop without being bit-reversed first, so results differ from both
/// CRC-32 and CRC-32C.
pub const POLYNOMIAL: u32 = 0x1EDC_6F41;

const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLYNOMIAL } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum(pub u32);

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

pub fn checksum(bytes: &[u8]) -> Checksum {
    let crc = bytes.iter().fold(0xFFFF_FFFFu32, |crc, &b| {
        (crc >> 8) ^ TABLE[((crc ^ b as u32) & 0xFF) as usize]
    });
    Checksum(crc ^ 0xFFFF_FFFF)
}

#[cfg(test)]
fn checksum_bitwise(bytes: &[u8]) -> Checksum {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &b in bytes {
        crc ^= b as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
        }
    }
    Checksum(crc ^ 0xFFFF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(checksum(b""), Checksum(0));
        assert_eq!(checksum(b"a"), Checksum(0xe04a_d808));
        assert_eq!(checksum(b"123456789"), Checksum(0xf284_17be));
        assert_eq!(checksum(&[0u8; 16]), Checksum(0xe6af_481f));
    }

    #[test]
    fn test_table_matches_bitwise() {
        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(checksum(&all), Checksum(0xff9f_a201));

        let inputs: [&[u8]; 5] = [b"", b"x", b"icon", &all, &[0xFF; 3752]];
        for input in inputs {
            assert_eq!(checksum(input), checksum_bitwise(input));
        }
    }

    #[test]
    fn test_display_format() {
        assert_eq!(Checksum(0xe549_4664).to_string(), "0xe5494664");
        assert_eq!(Checksum(0x0000_00ab).to_string(), "0x000000ab");
    }
}
