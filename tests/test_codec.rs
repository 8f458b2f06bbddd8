/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use huffstream::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn roundtrip(data: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let code = HuffmanCode::encode_bytes(data)?;
    let mut container = Vec::new();
    code.compress_bytes(data, &mut container)?;
    let mut restored = Vec::new();
    decompress_stream(&container[..], &mut restored)?;
    Ok((container, restored))
}

#[test]
fn test_roundtrip_known_text() -> Result<()> {
    for data in [
        &b"ab"[..],
        b"aaaabbc",
        b"abracadabra",
        b"the quick brown fox jumps over the lazy dog",
    ] {
        let (_, restored) = roundtrip(data)?;
        assert_eq!(restored, data);
    }
    Ok(())
}

#[test]
fn test_roundtrip_full_alphabet() -> Result<()> {
    // every byte value present, with wildly uneven counts
    let mut data = Vec::new();
    for value in 0..=255_u8 {
        data.extend(std::iter::repeat(value).take(1 + (value as usize) * 7 % 97));
    }
    let (_, restored) = roundtrip(&data)?;
    assert_eq!(restored, data);
    Ok(())
}

#[test]
fn test_roundtrip_random_multibuffer() -> Result<()> {
    // long enough that both the writer and the reader cycle their 64 KiB
    // buffers several times
    let mut structure = SmallRng::seed_from_u64(0);
    let mut values = SmallRng::seed_from_u64(1);
    for _ in 0..4 {
        let len = structure.random_range(150_000..250_000);
        let alphabet = structure.random_range(2..=64_u16) as u8;
        let data: Vec<u8> = (0..len).map(|_| values.random_range(0..alphabet)).collect();
        let (_, restored) = roundtrip(&data)?;
        assert_eq!(restored, data);
    }
    Ok(())
}

#[test]
fn test_skewed_source_compresses() -> Result<()> {
    // a heavily skewed distribution must come out smaller than the input
    let mut values = SmallRng::seed_from_u64(2);
    let data: Vec<u8> = (0..100_000)
        .map(|_| if values.random_range(0..100) < 90 { b'a' } else { values.random_range(b'b'..b'f') })
        .collect();
    let (container, restored) = roundtrip(&data)?;
    assert_eq!(restored, data);
    assert!(container.len() < data.len() / 2);
    Ok(())
}

#[test]
fn test_roundtrip_through_files() -> Result<()> {
    let dir = std::env::temp_dir();
    let source = dir.join(format!("huffstream_src_{}", std::process::id()));
    let packed = dir.join(format!("huffstream_cmp_{}", std::process::id()));
    let unpacked = dir.join(format!("huffstream_out_{}", std::process::id()));

    let mut values = SmallRng::seed_from_u64(3);
    let data: Vec<u8> = (0..200_000).map(|_| values.random_range(b'a'..=b'p')).collect();
    std::fs::write(&source, &data)?;

    let code = HuffmanCode::encode_path(&source)?;
    code.compress_path(&source, &packed)?;
    decompress_path(&packed, &unpacked)?;

    assert_eq!(std::fs::read(&unpacked)?, data);

    std::fs::remove_file(&source)?;
    std::fs::remove_file(&packed)?;
    std::fs::remove_file(&unpacked)?;
    Ok(())
}

#[test]
fn test_statistics_are_shannon_consistent() -> Result<()> {
    let mut structure = SmallRng::seed_from_u64(4);
    let mut values = SmallRng::seed_from_u64(5);
    for _ in 0..10 {
        let alphabet = structure.random_range(2..=255_u16) as u8;
        let data: Vec<u8> = (0..10_000).map(|_| values.random_range(0..alphabet)).collect();
        let code = HuffmanCode::encode_bytes(&data)?;
        let stats = code.statistics();
        assert!(stats.entropy <= stats.average_length + 1e-9);
        // Huffman stays within one bit of the entropy
        assert!(stats.average_length < stats.entropy + 1.0);
        assert!(stats.efficiency <= 1.0 + 1e-9);
        assert!(stats.variance >= 0.0);
    }
    Ok(())
}

#[test]
fn test_container_payload_matches_table_prediction() -> Result<()> {
    let data = b"mississippi river";
    let code = HuffmanCode::encode_bytes(data)?;
    let mut container = Vec::new();
    code.compress_bytes(data, &mut container)?;
    // the table predicts the exact payload size, and the container adds
    // the header, the 3-bit field, and under one byte of padding
    let payload_bits = code.table().payload_bits();
    assert!(payload_bits > 0);
    assert!((container.len() as u64) * 8 >= payload_bits + 3);
    assert!((container.len() as u64) * 8 < payload_bits + 3 + 8 + 2 * 256 + 8);
    Ok(())
}
