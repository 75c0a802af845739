use gdbmi::Options;

fn main() {
    divan::main();
}

const BREAK_INSERT: &str = "=breakpoint-created,bkpt={number=\"1\",type=\"breakpoint\",disp=\"keep\",enabled=\"y\",addr=\"0x0000000000001139\",func=\"main\",file=\"main.c\",fullname=\"/tmp/main.c\",line=\"4\",thread-groups=[\"i1\"],times=\"0\",original-location=\"main\"}\n3^done,bkpt={number=\"1\",type=\"breakpoint\",disp=\"keep\",enabled=\"y\",addr=\"0x0000000000001139\",func=\"main\",file=\"main.c\",fullname=\"/tmp/main.c\",line=\"4\",thread-groups=[\"i1\"],times=\"0\",original-location=\"main\"}\n(gdb)\n";

fn stack_list_frames(depth: usize) -> String {
    let frames = (0..depth)
        .map(|level| {
            format!(
                "frame={{level=\"{level}\",addr=\"0x{:016x}\",func=\"f{level}\",file=\"main.c\",fullname=\"/tmp/main.c\",line=\"{}\",arch=\"i386:x86-64\"}}",
                0x5555_5555_5000u64 + level as u64 * 0x10,
                level + 1
            )
        })
        .collect::<Vec<_>>()
        .join(",");

    format!("^done,stack=[{frames}]\n(gdb)\n")
}

fn console_stream(lines: usize) -> String {
    let mut output = String::new();
    for i in 0..lines {
        output.push_str(&format!(
            "~\"Reading symbols from /usr/lib/debug/lib{i}.so.debug...\\n\"\n"
        ));
    }
    output.push_str("^done\n(gdb)\n");
    output
}

#[divan::bench(name = "parse_break_insert")]
fn parse_break_insert() -> gdbmi::Document {
    gdbmi::parse(divan::black_box(BREAK_INSERT), Options::default()).unwrap()
}

#[divan::bench(name = "tokenize_break_insert")]
fn tokenize_break_insert() -> Vec<gdbmi::Token> {
    gdbmi::tokenize(divan::black_box(BREAK_INSERT), Options::default()).unwrap()
}

#[divan::bench(args = [10, 100, 1000])]
fn parse_stack_list_frames(bencher: divan::Bencher, depth: usize) {
    let output = stack_list_frames(depth);
    bencher.bench(|| gdbmi::parse(divan::black_box(&output), Options::pedantic()).unwrap());
}

#[divan::bench(args = [10, 100, 1000])]
fn parse_console_stream(bencher: divan::Bencher, lines: usize) {
    let output = console_stream(lines);
    bencher.bench(|| gdbmi::parse(divan::black_box(&output), Options::default()).unwrap());
}

#[divan::bench(args = [100])]
fn render_stack_list_frames(bencher: divan::Bencher, depth: usize) {
    let document = gdbmi::parse(&stack_list_frames(depth), Options::default()).unwrap();
    bencher.bench(|| divan::black_box(&document).to_string());
}
