use regex::Regex;

pub type ParseResult<I, O> = Option<(I, O)>;

pub trait Parser<I> {
    type Output;

    fn parse(&mut self, input: I) -> ParseResult<I, Self::Output>;
}

impl<I, O, F> Parser<I> for F
where
    F: FnMut(I) -> Option<(I, O)>,
{
    type Output = O;

    fn parse(&mut self, input: I) -> Option<(I, Self::Output)> {
        self(input)
    }
}

pub struct TagParser<'t> {
    tag: &'t str,
}

pub fn tag<'t>(tag: &'t str) -> TagParser<'t> {
    TagParser { tag }
}

impl<'i, 't: 'i> Parser<&'i str> for TagParser<'t> {
    type Output = &'i str;

    fn parse(&mut self, input: &'i str) -> Option<(&'i str, Self::Output)> {
        input
            .strip_prefix(self.tag)
            .map(|remaining| (remaining, self.tag))
    }
}

/// Matches an anchored pattern (`^...`) at the start of the input.
///
/// The pattern is compiled once, when the parser is built, so build the
/// parser outside of any per-line loop.
pub struct RegexParser {
    regex: Regex,
}

pub fn regex(pattern: &str) -> RegexParser {
    RegexParser {
        regex: Regex::new(pattern).expect("combinator patterns are static and valid"),
    }
}

impl<'i> Parser<&'i str> for RegexParser {
    type Output = &'i str;

    fn parse(&mut self, input: &'i str) -> Option<(&'i str, Self::Output)> {
        let m = self.regex.find(input)?;
        if m.start() != 0 {
            return None;
        }

        let (found, remaining) = input.split_at(m.end());
        Some((remaining, found))
    }
}

pub fn eof(input: &str) -> ParseResult<&str, ()> {
    if input.is_empty() {
        Some((input, ()))
    } else {
        None
    }
}

pub fn map<I, O1, O2>(
    mut p1: impl Parser<I, Output = O1>,
    mut f: impl FnMut(O1) -> O2,
) -> impl Parser<I, Output = O2> {
    move |input: I| p1.parse(input).map(|(remaining, res)| (remaining, f(res)))
}

macro_rules! succ (
  (0, $submac:ident!($($rest:tt)*)) => ($submac!(1, $($rest)*));
  (1, $submac:ident!($($rest:tt)*)) => ($submac!(2, $($rest)*));
  (2, $submac:ident!($($rest:tt)*)) => ($submac!(3, $($rest)*));
);

pub trait Seq<I> {
    type Output;

    fn parse_seq(&mut self, input: I) -> ParseResult<I, Self::Output>;
}

macro_rules! seq_impl_inner {
    ($it:tt, $self:expr, $input:expr, (), $head:ident $($id:ident)+) => {
        if let Some((input, res)) = $self.$it.parse($input) {
            succ!($it, seq_impl_inner!($self, input, ( res ), $($id)+))
        } else {
            None
        }
    };
    ($it:tt, $self:expr, $input:expr, ($($parsed:tt)*), $head:ident $($id:ident)+) => {
        if let Some((input, res)) = $self.$it.parse($input) {
            succ!($it, seq_impl_inner!($self, input, ( $($parsed)*, res ), $($id)+))
        } else {
            None
        }
    };
    ($it:tt, $self:expr, $input:expr, ($($parsed:tt)*), $head:ident) => {
        if let Some((input, res)) = $self.$it.parse($input) {
            Some((input, ($($parsed)* , res)))
        } else {
            None
        }
    };
}

macro_rules! seq_impl {
    ($($name:ident $ty:ident),+) => {
        impl<I, $($name),+, $($ty),+> Seq<I> for ($($name),+)
        where
            $($name: Parser<I, Output = $ty>,)+
        {
            type Output = ($($ty),+);

            fn parse_seq(&mut self, input: I) -> Option<(I, Self::Output)> {
                seq_impl_inner!(0, self, input, (), $($name)+)
            }
        }
    };
}

seq_impl!(P0 O0, P1 O1);
seq_impl!(P0 O0, P1 O1, P2 O2);
seq_impl!(P0 O0, P1 O1, P2 O2, P3 O3);

pub fn seq<I, O, List: Seq<I, Output = O>>(mut list: List) -> impl Parser<I, Output = O> {
    move |input: I| list.parse_seq(input)
}

pub fn preceded<I, P1, O1, P2, O2>(p1: P1, p2: P2) -> impl Parser<I, Output = O2>
where
    P1: Parser<I, Output = O1>,
    P2: Parser<I, Output = O2>,
{
    map(seq((p1, p2)), |(_, r2)| r2)
}

pub fn terminated<I, P1, O1, P2, O2>(p1: P1, p2: P2) -> impl Parser<I, Output = O1>
where
    P1: Parser<I, Output = O1>,
    P2: Parser<I, Output = O2>,
{
    map(seq((p1, p2)), |(r1, _)| r1)
}

pub fn many<P, I: Clone, O>(minimum: usize, mut p: P) -> impl Parser<I, Output = Vec<O>>
where
    P: Parser<I, Output = O>,
{
    move |mut input: I| {
        let mut results = vec![];
        while let Some((remaining, res)) = p.parse(input.clone()) {
            input = remaining;
            results.push(res);
        }

        if results.len() >= minimum {
            Some((input, results))
        } else {
            None
        }
    }
}

pub fn many0<P, I: Clone, O>(p: P) -> impl Parser<I, Output = Vec<O>>
where
    P: Parser<I, Output = O>,
{
    many(0, p)
}

pub fn many1<P, I: Clone, O>(p: P) -> impl Parser<I, Output = Vec<O>>
where
    P: Parser<I, Output = O>,
{
    many(1, p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_and_regex() {
        assert_eq!(tag("ab").parse("abc"), Some(("c", "ab")));
        assert_eq!(tag("ab").parse("ba"), None);

        assert_eq!(regex("^[a-z]+").parse("jqt: rhn"), Some((": rhn", "jqt")));
        assert_eq!(regex("^[a-z]+").parse(" jqt"), None);
        assert_eq!(regex("[a-z]+").parse(" jqt"), None);
        assert_eq!(regex("^ *").parse("x"), Some(("x", "")));
    }

    #[test]
    fn sequencing() {
        let mut p = seq((regex("^[a-z]+"), tag(":"), regex("^ *")));
        assert_eq!(p.parse("abc:  def"), Some(("def", ("abc", ":", "  "))));
        assert_eq!(p.parse("abc def"), None);

        assert_eq!(
            terminated(regex("^[a-z]+"), tag(":")).parse("abc:"),
            Some(("", "abc"))
        );
        assert_eq!(
            preceded(regex("^ +"), regex("^[a-z]+")).parse("  abc"),
            Some(("", "abc"))
        );
    }

    #[test]
    fn repetition() {
        let mut words = many1(preceded(regex("^ +"), regex("^[a-z]+")));
        assert_eq!(words.parse(" a bb ccc!"), Some(("!", vec!["a", "bb", "ccc"])));
        assert_eq!(words.parse("a"), None);

        assert_eq!(many0(tag("x")).parse("yy"), Some(("yy", vec![])));
        assert_eq!(eof.parse(""), Some(("", ())));
        assert_eq!(eof.parse(" "), None);
    }
}
