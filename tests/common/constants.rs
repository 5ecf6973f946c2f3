#![allow(dead_code)]

pub const IMPORT_TRIGGER: &str = "test-import";
pub const DESK_TRIGGER: &str = "front-desk";

pub const WHO_AND_QUEEN_CSV: &str = "\
Artist,AlbumTitle,SortKey2,SortKey3,Year,Special
The Who,Quadrophenia,5,10,1973,
Queen,A Night at the Opera,5,10,1975,yes
";

/// Five genre-5 records whose artists start with A to E.
pub const FIVE_ROCK_CSV: &str = "\
Artist,AlbumTitle,SortKey2,SortKey3
Eagles,Hotel California,5,10
Cream,Disraeli Gears,5,10
The Beatles,Abbey Road,5,10
Deep Purple,Machine Head,5,10
Abba,Arrival,5,10
";
