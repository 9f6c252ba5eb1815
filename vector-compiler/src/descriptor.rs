// vector-compiler/src/descriptor.rs
// Renders test records as harness macro invocations

use crate::record::TestRecord;
use crate::registers::{format_bank, format_scalar, RegisterContext};
use crate::target::Target;

/// Format one record as a single descriptor line, without the newline.
///
/// Field order is fixed by the harness macro:
/// name, bytes, length, offset, then the in and out contexts, each as
/// fpscr, r0-r15, fr0-fr15, xf0-xf15.
pub fn format_descriptor(target: &Target, record: &TestRecord) -> String {
    let mut fields = Vec::with_capacity(12);
    fields.push(record.name.clone());
    fields.push(format!("(uint8_t *)\"{}\"", escape_bytes(&record.binary)));
    fields.push(record.binary.len().to_string());
    fields.push(format!("{:#x}", record.offset));
    push_context(&mut fields, &record.input);
    push_context(&mut fields, &record.output);

    format!("{}({})", target.descriptor_macro, fields.join(","))
}

fn push_context(fields: &mut Vec<String>, ctx: &RegisterContext) {
    fields.push(format_scalar(ctx.fpscr));
    fields.push(format_bank(&ctx.r));
    fields.push(format_bank(&ctx.fr));
    fields.push(format_bank(&ctx.xf));
}

/// C string literal body with every byte written as `\xNN`.
fn escape_bytes(bytes: &[u8]) -> String {
    let digits = hex::encode(bytes);
    let mut out = String::with_capacity(bytes.len() * 4);
    for pair in digits.as_bytes().chunks(2) {
        out.push_str("\\x");
        out.extend(pair.iter().map(|&b| b as char));
    }
    out
}
