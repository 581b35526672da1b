//! # Folio CLI
//!
//! Usage:
//!   folio input.json -o layout.json
//!   echo '{ ... }' | folio
//!   folio --example > report.json
//!
//! Prints a JSON summary of the laid-out pages. Set `RUST_LOG=debug` to
//! follow page selection and page completion.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map(|_| buf)
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => {
            eprintln!("✗ Failed to read input: {e}");
            process::exit(1);
        }
    };

    // Parse output path
    let output_path = args.windows(2).find(|w| w[0] == "-o").map(|w| w[1].clone());

    let info = match folio::paginate_json(&input) {
        Ok(info) => info,
        Err(e) => {
            eprintln!("✗ {e}");
            process::exit(1);
        }
    };

    let json = match serde_json::to_string_pretty(&info) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("✗ Failed to serialize layout: {e}");
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("✗ Failed to write {path}: {e}");
                process::exit(1);
            }
            eprintln!("✓ Laid out {} page(s) into {}", info.pages.len(), path);
        }
        None => println!("{json}"),
    }
}

fn example_report_json() -> &'static str {
    r##"{
  "masters": [
    {
      "name": "first",
      "size": "Letter",
      "margin": { "top": 36, "right": 36, "bottom": 36, "left": 36 },
      "regions": {
        "Body": { "name": "xsl-region-body", "margin": { "top": 72, "right": 0, "bottom": 36, "left": 0 } },
        "After": { "name": "footer", "extent": 36 }
      }
    },
    {
      "name": "rest",
      "size": "Letter",
      "margin": { "top": 36, "right": 36, "bottom": 36, "left": 36 },
      "regions": {
        "Body": {
          "name": "xsl-region-body",
          "margin": { "top": 36, "right": 0, "bottom": 36, "left": 0 },
          "columnCount": 2,
          "columnGap": 18
        },
        "Before": { "name": "header", "extent": 36 },
        "After": { "name": "footer", "extent": 36 }
      }
    }
  ],
  "sequences": [
    {
      "masterSequence": [
        { "masterReference": "first", "pagePosition": "First" },
        { "masterReference": "rest" }
      ],
      "staticContent": {
        "header": [
          {
            "extent": 14,
            "content": { "type": "RetrieveMarker", "className": "chapter" }
          }
        ],
        "footer": [
          { "extent": 12, "content": { "type": "PageNumber" } }
        ]
      },
      "blocks": [
        {
          "extent": 48,
          "span": "All",
          "id": "summary",
          "markers": [{ "className": "chapter", "text": "Summary" }],
          "content": { "type": "Text", "text": "Quarterly Report" }
        },
        { "extent": 240, "content": { "type": "Text", "text": "Revenue grew across all regions." } },
        { "extent": 12, "class": "Footnote", "content": { "type": "Text", "text": "Unaudited figures." } },
        { "extent": 320, "content": { "type": "Text", "text": "Regional breakdown." } },
        {
          "extent": 48,
          "breakBefore": "Page",
          "id": "outlook",
          "markers": [{ "className": "chapter", "text": "Outlook" }],
          "content": { "type": "Text", "text": "Outlook" }
        },
        { "extent": 200, "content": { "type": "Text", "text": "Next quarter is expected to be flat." } },
        { "extent": 14, "content": { "type": "PageCitation", "refId": "summary" } }
      ]
    }
  ]
}
"##
}
