//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use ::cat::copy::simple_copy;
use ::cat::line_counter::LineCounter;
use ::cat::transcode::{cat, Buffers, Options, Session};
use proptest::{prelude::TestCaseError, prop_assert, prop_assert_eq, test_runner::TestRunner};

fn get_test_runner(cases: u32) -> TestRunner {
    TestRunner::new(proptest::test_runner::Config {
        cases,
        failure_persistence: None,

        ..proptest::test_runner::Config::default()
    })
}

fn transcode(input: &[u8], options: &Options, insize: usize, outsize: usize) -> Vec<u8> {
    let mut session = Session::new();
    let mut buffers = Buffers::new(insize, outsize);
    let mut output = Vec::new();
    let mut reader = input;
    cat(&mut reader, &mut output, &mut buffers, options, &mut session).unwrap();
    session.finish(&mut output).unwrap();
    output
}

/// Bytes biased towards the ones the transformations care about.
fn interesting_bytes(max_len: usize) -> impl proptest::strategy::Strategy<Value = Vec<u8>> {
    use proptest::prelude::*;

    proptest::collection::vec(
        prop_oneof![
            3 => Just(b'\n'),
            2 => Just(b'\r'),
            1 => Just(b'\t'),
            4 => proptest::num::u8::ANY,
        ],
        0..max_len,
    )
}

#[test]
fn test_identity_without_options() {
    get_test_runner(128)
        .run(
            &(interesting_bytes(2048), 1_usize..64, 1_usize..64),
            |(input, insize, outsize)| {
                let transformed = transcode(&input, &Options::default(), insize, outsize);
                prop_assert_eq!(&transformed, &input);

                let mut relayed = Vec::new();
                let mut buf = vec![0u8; insize];
                simple_copy(&mut &input[..], &mut relayed, &mut buf)
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(&relayed, &input);

                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_squeeze_never_leaves_two_blank_lines() {
    let options = Options {
        squeeze_blank: true,
        ..Options::default()
    };

    get_test_runner(128)
        .run(
            &(interesting_bytes(2048), 1_usize..32),
            |(input, insize)| {
                let output = transcode(&input, &options, insize, 16);
                prop_assert!(!output.windows(3).any(|w| w == b"\n\n\n"));

                // only newlines are ever dropped
                let strip = |v: &[u8]| v.iter().copied().filter(|&b| b != b'\n').collect::<Vec<u8>>();
                prop_assert_eq!(strip(&output[..]), strip(&input[..]));

                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_show_ends_independent_of_buffer_size() {
    let options = Options {
        show_ends: true,
        ..Options::default()
    };

    get_test_runner(128)
        .run(
            &(interesting_bytes(1024), 1_usize..16, 1_usize..16),
            |(input, insize, outsize)| {
                let reference = transcode(&input, &options, 64 * 1024, 64 * 1024);
                let chunked = transcode(&input, &options, insize, outsize);
                prop_assert_eq!(&chunked, &reference);

                // every real newline is preceded by '$'
                let newlines = input.iter().filter(|&&b| b == b'\n').count();
                prop_assert_eq!(reference.windows(2).filter(|w| *w == b"$\n").count(), newlines);

                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_number_fields_count_lines() {
    let options = Options {
        number: true,
        ..Options::default()
    };

    get_test_runner(64)
        .run(&(1_usize..400, 1_usize..32), |(lines, insize)| {
            let input = b"line\n".repeat(lines);
            let output = transcode(&input, &options, insize, 32);

            let mut counter = LineCounter::new();
            let mut expected = Vec::new();
            for _ in 0..lines {
                counter.advance();
                expected.extend_from_slice(counter.render());
                expected.extend_from_slice(b"line\n");
            }
            prop_assert_eq!(output, expected);

            Ok(())
        })
        .unwrap();
}

#[test]
fn test_number_nonblank_skips_blank_lines() {
    let options = Options {
        number: true,
        number_nonblank: true,
        ..Options::default()
    };

    get_test_runner(64)
        .run(
            &proptest::collection::vec(proptest::bool::ANY, 0..200),
            |blank_pattern| {
                let mut input = Vec::new();
                let mut expected = Vec::new();
                let mut n = 0;
                for blank in blank_pattern {
                    if blank {
                        input.push(b'\n');
                        expected.push(b'\n');
                    } else {
                        n += 1;
                        input.extend_from_slice(b"text\n");
                        expected.extend_from_slice(format!("{n:6}\ttext\n").as_bytes());
                    }
                }

                prop_assert_eq!(transcode(&input, &options, 7, 9), expected);

                Ok(())
            },
        )
        .unwrap();
}
