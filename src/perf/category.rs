//! Request categories and the prefix table that assigns them.

// self
use crate::_prelude::*;

/// Closed set of request categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
	/// People, job, or content search.
	Search,
	/// Member profile lookups.
	Profile,
	/// Job postings.
	Job,
	/// Messaging.
	Message,
	/// Connections and invitations.
	Connection,
	/// Token endpoint traffic.
	Auth,
	/// Anything the table does not match.
	Other,
}
impl MetricCategory {
	/// Every category, in reporting order.
	pub const ALL: [MetricCategory; 7] = [
		MetricCategory::Search,
		MetricCategory::Profile,
		MetricCategory::Job,
		MetricCategory::Message,
		MetricCategory::Connection,
		MetricCategory::Auth,
		MetricCategory::Other,
	];

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			MetricCategory::Search => "search",
			MetricCategory::Profile => "profile",
			MetricCategory::Job => "job",
			MetricCategory::Message => "message",
			MetricCategory::Connection => "connection",
			MetricCategory::Auth => "auth",
			MetricCategory::Other => "other",
		}
	}
}
impl Display for MetricCategory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for MetricCategory {
	type Err = UnknownCategory;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|category| category.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| UnknownCategory(s.to_owned()))
	}
}

/// Raised when parsing an unknown category label.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown metric category `{0}`.")]
pub struct UnknownCategory(pub String);

/// Ordered `(prefix, category)` bindings resolved by longest match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTable(Vec<(String, MetricCategory)>);
impl CategoryTable {
	/// Builds a table from arbitrary bindings.
	pub fn new<I, S>(bindings: I) -> Self
	where
		I: IntoIterator<Item = (S, MetricCategory)>,
		S: Into<String>,
	{
		Self(bindings.into_iter().map(|(prefix, category)| (prefix.into(), category)).collect())
	}

	/// Bindings for the LinkedIn REST endpoints used by the server.
	pub fn linkedin() -> Self {
		Self::new([
			("/search", MetricCategory::Search),
			("/search/jobs", MetricCategory::Job),
			("/people", MetricCategory::Profile),
			("/me", MetricCategory::Profile),
			("/userinfo", MetricCategory::Profile),
			("/jobs", MetricCategory::Job),
			("/jobPostings", MetricCategory::Job),
			("/messages", MetricCategory::Message),
			("/messaging", MetricCategory::Message),
			("/conversations", MetricCategory::Message),
			("/connections", MetricCategory::Connection),
			("/invitations", MetricCategory::Connection),
			("/accessToken", MetricCategory::Auth),
			("/oauth", MetricCategory::Auth),
		])
	}

	/// Resolves `path` to the category of the longest matching prefix.
	///
	/// Equal-length matches keep the earlier binding; no match yields [`MetricCategory::Other`].
	pub fn resolve(&self, path: &str) -> MetricCategory {
		self.0
			.iter()
			.filter(|(prefix, _)| path.starts_with(prefix.as_str()))
			.fold(None::<&(String, MetricCategory)>, |best, candidate| match best {
				Some(current) if current.0.len() >= candidate.0.len() => Some(current),
				_ => Some(candidate),
			})
			.map_or(MetricCategory::Other, |(_, category)| *category)
	}

	/// Returns the bindings in table order.
	pub fn bindings(&self) -> &[(String, MetricCategory)] {
		&self.0
	}
}
impl Default for CategoryTable {
	fn default() -> Self {
		Self::linkedin()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn resolves_by_longest_prefix() {
		let table = CategoryTable::linkedin();

		assert_eq!(table.resolve("/people/abc"), MetricCategory::Profile);
		assert_eq!(table.resolve("/search/people"), MetricCategory::Search);
		assert_eq!(table.resolve("/search/jobs?keywords=rust"), MetricCategory::Job);
		assert_eq!(table.resolve("/messages/42"), MetricCategory::Message);
		assert_eq!(table.resolve("/me"), MetricCategory::Profile);
		assert_eq!(table.resolve("/connections"), MetricCategory::Connection);
		assert_eq!(table.resolve("/accessToken"), MetricCategory::Auth);
		assert_eq!(table.resolve("/companies/1"), MetricCategory::Other);
		assert_eq!(table.resolve(""), MetricCategory::Other);
	}

	#[test]
	fn longer_prefix_wins_regardless_of_order() {
		let table = CategoryTable::new([
			("/people/search", MetricCategory::Search),
			("/people", MetricCategory::Profile),
		]);

		assert_eq!(table.resolve("/people/search?q=rust"), MetricCategory::Search);
		assert_eq!(table.resolve("/people/xyz"), MetricCategory::Profile);

		let reversed = CategoryTable::new([
			("/people", MetricCategory::Profile),
			("/people/search", MetricCategory::Search),
		]);

		assert_eq!(reversed.resolve("/people/search?q=rust"), MetricCategory::Search);
	}

	#[test]
	fn equal_length_keeps_first_binding() {
		let table = CategoryTable::new([("/x", MetricCategory::Job), ("/x", MetricCategory::Auth)]);

		assert_eq!(table.resolve("/x/1"), MetricCategory::Job);
	}

	#[test]
	fn labels_round_trip_through_from_str() {
		for category in MetricCategory::ALL {
			assert_eq!(category.as_str().parse::<MetricCategory>(), Ok(category));
		}

		assert_eq!("PROFILE".parse::<MetricCategory>(), Ok(MetricCategory::Profile));
		assert!("campaign".parse::<MetricCategory>().is_err());
	}
}
