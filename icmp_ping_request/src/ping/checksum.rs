//! Internet checksum (RFC 1071) in the two byte-order conventions used when
//! filling ICMP echo headers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumConvention {
    /// Little-endian word sum, byte-swapped at the end. The result is the
    /// checksum as a big-endian number and goes on the wire in network order.
    WordSwap,
    /// Little-endian word sum used as is. Its wire form is little-endian.
    Direct,
}

impl Default for ChecksumConvention {
    fn default() -> Self {
        Self::WordSwap
    }
}

impl ChecksumConvention {
    pub fn compute(self, data: &[u8]) -> u16 {
        let folded = !fold(sum_le_words(data)) as u16;
        match self {
            Self::WordSwap => folded.swap_bytes(),
            Self::Direct => folded,
        }
    }

    /// Value to store in a big-endian header field so that the bytes on the
    /// wire are the ones this convention produces.
    pub fn to_network(self, value: u16) -> u16 {
        match self {
            Self::WordSwap => value,
            Self::Direct => value.swap_bytes(),
        }
    }
}

fn sum_le_words(data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(2);
    let mut sum = 0u32;
    for pair in &mut chunks {
        sum = sum.wrapping_add(pair[0] as u32 + ((pair[1] as u32) << 8));
    }
    if let [last] = chunks.remainder() {
        sum = sum.wrapping_add(*last as u32);
    }
    sum
}

fn fold(mut sum: u32) -> u32 {
    while sum >> 16 != 0 {
        sum = (sum & 0xFF_FF) + (sum >> 16);
    }
    sum
}

/// True when `data`, checksum field included, sums to zero.
pub fn verify(data: &[u8]) -> bool {
    ChecksumConvention::Direct.compute(data) == 0
}

#[cfg(test)]
mod test {
    use super::*;

    const BOTH: [ChecksumConvention; 2] =
        [ChecksumConvention::WordSwap, ChecksumConvention::Direct];

    fn vector_21() -> Vec<u8> {
        (1..=21).collect()
    }

    #[test]
    fn zero_buffer() {
        for convention in BOTH.iter() {
            assert_eq!(convention.compute(&[0; 20]), 0xFF_FF);
            assert_eq!(convention.compute(&[0; 192]), 0xFF_FF);
            assert_eq!(convention.compute(&[]), 0xFF_FF);
        }
    }

    #[test]
    fn odd_length_vector() {
        let data = vector_21();
        assert_eq!(ChecksumConvention::Direct.compute(&data), 0x91_86);
        assert_eq!(ChecksumConvention::WordSwap.compute(&data), 0x86_91);

        let mut padded = data.clone();
        padded.push(0);
        for convention in BOTH.iter() {
            assert_eq!(convention.compute(&data), convention.compute(&padded));
        }
    }

    #[test]
    fn self_verifying() {
        let mut header = vec![8, 0, 0, 0, 0x12, 0x34, 0x00, 0x07];
        header.extend(std::iter::repeat(b'Q').take(192));
        for convention in BOTH.iter() {
            let mut data = header.clone();
            let sum = convention.to_network(convention.compute(&data));
            data[2..4].copy_from_slice(&sum.to_be_bytes());
            assert!(verify(&data), "{:?}", convention);
            assert_eq!(convention.compute(&data), 0);
        }
    }

    #[test]
    fn conventions_agree_on_the_wire() {
        let data = vector_21();
        let word_swap = ChecksumConvention::WordSwap;
        let direct = ChecksumConvention::Direct;
        assert_eq!(
            word_swap.to_network(word_swap.compute(&data)),
            direct.to_network(direct.compute(&data))
        );
    }

    #[test]
    fn word_swap_matches_pnet() {
        let mut data = vec![8, 0, 0xAB, 0xCD, 0xBE, 0xEF, 0x01, 0x00];
        data.extend_from_slice(b"some odd payload!");
        let expected = pnet::util::checksum(&data, 1);
        data[2] = 0;
        data[3] = 0;
        assert_eq!(ChecksumConvention::WordSwap.compute(&data), expected);
    }

    #[test]
    fn carries_are_folded() {
        let data = [0xFF; 220];
        for convention in BOTH.iter() {
            assert_eq!(convention.compute(&data), 0);
        }
        assert_eq!(ChecksumConvention::Direct.compute(&[0xFF, 0xFF, 0x01, 0x00]), 0xFF_FE);
    }
}
