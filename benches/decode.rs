use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gif2bmp::{convert, Decoder};
use std::io::{self, Cursor};

/// Build a 256x256 GIF with a full 256 color table
fn make_gif() -> Vec<u8> {
    let (width, height) = (256u16, 256u16);
    let mut indices = Vec::with_capacity(usize::from(width) * usize::from(height));
    let mut seed = 0x2545_F491u32;
    for y in 0..height {
        for x in 0..width {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let noise = (seed >> 29) as u16;
            indices.push(((x / 16 + y / 16 + noise) & 0xFF) as u8);
        }
    }
    let mut compressed = vec![];
    {
        let mut enc =
            lzw::Encoder::new(lzw::LsbWriter::new(&mut compressed), 8).unwrap();
        enc.encode_bytes(&indices).unwrap();
    }
    let mut gif = b"GIF89a".to_vec();
    gif.extend_from_slice(&width.to_le_bytes());
    gif.extend_from_slice(&height.to_le_bytes());
    gif.extend_from_slice(&[0xF7, 0x00, 0x00]);
    for i in 0..=255u8 {
        gif.extend_from_slice(&[i, 255 - i, i / 2]);
    }
    gif.push(0x2C);
    gif.extend_from_slice(&[0, 0, 0, 0]);
    gif.extend_from_slice(&width.to_le_bytes());
    gif.extend_from_slice(&height.to_le_bytes());
    gif.extend_from_slice(&[0x00, 0x08]);
    for chunk in compressed.chunks(255) {
        gif.push(chunk.len() as u8);
        gif.extend_from_slice(chunk);
    }
    gif.extend_from_slice(&[0x00, 0x3B]);
    gif
}

fn decode_image(crit: &mut Criterion) {
    let gif = make_gif();

    crit.bench_function("decode_image", |b| {
        b.iter(|| {
            let mut dec = Decoder::new(Cursor::new(black_box(&gif[..])));
            black_box(dec.decode().unwrap());
        })
    });
}

fn convert_image(crit: &mut Criterion) {
    let gif = make_gif();

    crit.bench_function("convert_image", |b| {
        b.iter(|| {
            black_box(convert(Cursor::new(black_box(&gif[..])), io::sink()).unwrap());
        })
    });
}

criterion_group!(benches, decode_image, convert_image);
criterion_main!(benches);
