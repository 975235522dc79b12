//
// This loads an NBT file from any edition, compressed or not, working the
// format out from the bytes, and pretty-prints the tag tree.
//

fn main() {
    let path = std::env::args().nth(1).unwrap();
    let doc = kelpnbt::from_path(path).unwrap();

    eprintln!("format: {:?}", doc.format());
    println!("{doc}");
}
