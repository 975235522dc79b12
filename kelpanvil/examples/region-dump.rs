use std::fs::File;

use kelpanvil::Region;

//
// This loads a region file and pretty-prints every chunk document in it.
//

fn main() {
    let path = std::env::args().nth(1).unwrap();
    let file = File::open(path).unwrap();

    let mut region = Region::from_stream(file).unwrap();

    for chunk in region.iter() {
        let chunk = chunk.unwrap();
        let doc = kelpnbt::from_bytes(&chunk.data).unwrap();

        println!("chunk ({}, {}):", chunk.x, chunk.z);
        println!("{doc}");
    }
}
