/*!

This is the long-form manual for `topsis` and the `topsis` command line program.

## The algorithm

TOPSIS ranks alternatives (the rows of a table) against several criteria (its numeric
columns). Each criterion has a weight and a direction of preference, its impact:

* `+` benefit: higher values are better
* `-` cost: lower values are better

The evaluation follows these steps:

1. Every criterion column is divided by its euclidean norm. A column made only of zeros
   cannot be normalized and is reported as a degenerate column.
2. The weights are scaled to sum to 1, and every normalized column is multiplied by its
   weight.
3. For each criterion, the ideal best value is the maximum of the weighted column for a
   benefit and its minimum for a cost. The ideal worst value is the opposite.
4. For each alternative, `S+` is the euclidean distance to the ideal best solution and `S-`
   the distance to the ideal worst solution.
5. The score is `S- / (S+ + S-)`, between 0 and 1. It is published with 6 decimals.
6. Alternatives are ranked by decreasing score. Ranks are distinct: when two alternatives
   have the same score, the one that appears first in the table gets the better rank.

When every criterion is constant, all the alternatives coincide with both ideal solutions
and `S+ + S-` is zero. By default these alternatives receive a score of 0. The
[crate::DegenerateRow::Fail] policy turns this situation into an error instead.

Scaling all the weights by the same positive factor does not change the outcome.

## Input format

The input is a table with a header row:

* the first column is the label of the alternative (any content)
* the other columns are the criteria, at least 2 of them. Every cell must be a number.

```text
Model,Price,Storage,Camera,Looks
M1,250,16,12,5
M2,200,16,8,3
M3,300,32,16,4
```

The command line program reads comma-separated files (`csv`) and Excel workbooks (`xlsx`).

The weights and impacts are given as comma-separated lists, with one entry per criterion,
in the order of the columns. For the table above: `1,1,1,2` and `-,+,+,+`. Spaces around
the entries are ignored. Empty entries (for example the trailing one in `1,1,1,2,`) are
dropped by default, or rejected with [crate::EmptyTokens::Reject]. Lists that are already
split into entries go through [crate::validate_inputs].

## Output format

The output repeats the input table, unchanged and in the same order, with two more columns:
`Topsis Score` and `Rank`.

## Errors

| Category | Cause |
|----------|-------|
| `SchemaError` | fewer than 3 columns, no rows, rows of different lengths |
| `DataTypeError` | non-numeric values. All the offending columns are named. |
| `FormatError` | malformed weights or impacts: no comma, empty list, invalid entry, weight not strictly positive |
| `CardinalityError` | the number of weights or impacts differs from the number of criteria |
| `DegenerateColumnError` | a criterion column only contains zeros |
| `DegenerateRowError` | only with the failing policy, see above |
| `PreconditionError` | the engine was called directly with inconsistent inputs |

*/
