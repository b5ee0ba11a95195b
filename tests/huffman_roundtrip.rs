// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Text -> Huffman bits -> carrier -> bits -> text.

use lsbkit::carrier::wav::Samples;
use lsbkit::{
    hide, hide_file, retrieve, retrieve_file, Addressing, AudioCarrier, Codebook, HuffmanCoder,
    PayloadBits, PositionSource, StegoError,
};

const DICTIONARY: &str = "It was the best of times, it was the worst of times, \
it was the age of wisdom, it was the age of foolishness.";

#[test]
fn text_survives_audio_carrier() {
    let book = Codebook::from_text(DICTIONARY);
    let message = "it was the age of times";
    let bits = book.encode(message).unwrap();
    assert!(bits.len() < message.len() * 8);

    let samples: Vec<i16> = (0..3_000).map(|i| ((i * 37) % 4_001) as i16 - 2_000).collect();
    let mut carrier = AudioCarrier::from_samples(Samples::I16(samples), 1, 22_050).unwrap();
    let source = PositionSource::seeded(31_337);
    hide(&mut carrier, &bits, &source, 0).unwrap();

    let recovered = retrieve(&carrier, &source).unwrap();
    assert_eq!(recovered, bits);
    assert_eq!(book.decode(&recovered).unwrap(), message);
}

#[test]
fn codebook_rebuilt_from_dictionary_file_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let dict = dir.path().join("dict.txt");
    std::fs::write(&dict, DICTIONARY).unwrap();

    // Sender and receiver each build their own codebook from the same file.
    let mut sender = HuffmanCoder::new();
    sender.load_dictionary(&dict).unwrap();
    let mut receiver = HuffmanCoder::new();
    receiver.load_dictionary(&dict).unwrap();
    assert_eq!(sender.codebook(), receiver.codebook());

    let payload_path = dir.path().join("payload.txt");
    let bits = sender.encode("the worst of wisdom").unwrap();
    bits.write_lines(&payload_path, 8).unwrap();

    let cover = dir.path().join("cover.wav");
    let stego = dir.path().join("stego.wav");
    let c = AudioCarrier::from_samples(Samples::U8(vec![0x80; 2_000]), 1, 8_000).unwrap();
    std::fs::write(&cover, c.to_wav_bytes().unwrap()).unwrap();
    hide_file(&cover, &payload_path, &stego, &Addressing::EmbeddedSeed, 0).unwrap();

    let recovered = retrieve_file(&stego, &Addressing::EmbeddedSeed, None, 4).unwrap();
    assert_eq!(receiver.decode(&recovered).unwrap(), "the worst of wisdom");
}

#[test]
fn wrong_seed_does_not_reproduce_text() {
    let book = Codebook::from_text(DICTIONARY);
    let bits = book.encode("best of times").unwrap();
    let samples = Samples::U8((0..1_000).map(|i| (i * 13) as u8).collect());
    let mut carrier = AudioCarrier::from_samples(samples, 1, 8_000).unwrap();
    hide(&mut carrier, &bits, &PositionSource::seeded(1), 0).unwrap();

    let garbage = retrieve(&carrier, &PositionSource::seeded(2)).unwrap();
    assert_eq!(garbage.len(), bits.len());
    match book.decode(&garbage) {
        Ok(text) => assert_ne!(text, "best of times"),
        Err(StegoError::UndecodableResidue(_)) => {}
        Err(e) => panic!("unexpected error {e}"),
    }
}

#[test]
fn symbol_outside_dictionary() {
    let book = Codebook::from_text(DICTIONARY);
    assert!(matches!(book.encode("times!"), Err(StegoError::UnknownSymbol('!'))));
    assert!(book.decode(&PayloadBits::default()).unwrap().is_empty());
}
