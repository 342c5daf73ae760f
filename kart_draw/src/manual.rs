/*!

This is the long-form manual for `kart_draw` and `kartdraw`.

## How a draw works

Every driver of the draw gets one kart, and no kart goes to two drivers. The program
first looks for an assignment in which nobody gets a kart from their history. If one
exists, it is always found, and which one is picked is random.

If there is none, the draw stops and asks before going on. The question names the
drivers who already used as many karts as there are in the draw, since they get a
repeat whatever happens. When the draw is confirmed, karts are handed out with the
fallback of the rules:

* `greedy` (default) the drivers pick in the order of the roster, each taking the
  first kart of a shuffled pool that they did not use yet, or the first kart left.
* `maximum` as many drivers as possible get a new kart, and the others share the
  karts left.

More drivers than karts is an error. Fewer drivers than karts is fine: some karts stay
in the paddock.

## Names and kart labels

Names and labels are compared without surrounding spaces and without case: `Ana`,
` ana` and `ANA ` are the same driver. The roster keeps the first spelling of each
driver and drops the others. Kart labels may repeat: two karts labelled `7` are two
different karts.

## The history file

One driver per line, in one of two forms:

```text
Ana Lopez: 1, 4, 7
Bob, 2, 3
```

* Lines without a driver name are skipped. A malformed history never stops a draw.
* Everything after the first colon is the list of karts.
* When a driver appears on several lines, the last line wins.

With `--record append`, the draw adds one `Name: kart` line per driver at the end of
the file. Since the last line wins, each driver then only avoids the kart of the last
draw. With `--record accumulate`, the new kart is added to the karts each driver
already used, and the file is written again with one line per driver.

## Input formats

The roster of drivers can be read from:
* `text` (default) names separated by newlines or commas
* `csv` Comma Separated Values, one driver per row
* `xlsx` an Excel spreadsheet, one driver per row

For `csv` and `xlsx`, `nameColumnIndex` (or `--name-column`) gives the column of
the names and `firstRowIndex` (or `--first-row`) the first row with a driver, to skip
headers. Both start at 1. A column can also be given with its spreadsheet letters
(`A`, `B`, ..., `AB`). With `xlsx`, the first worksheet is used unless
`excelWorksheetName` is given.

## Configuration file

```json
{
  "outputSettings": { "eventName": "Round 3", "eventDate": "2026-10-18", "outputDirectory": "out" },
  "roster": { "provider": "csv", "filePath": "drivers.csv", "nameColumnIndex": 2, "firstRowIndex": 2 },
  "karts": ["1", "2", "3", "4", "5"],
  "historyFilePath": "history.txt",
  "rules": { "fallbackMode": "greedy", "randomSeed": "round-3", "historyMode": "append" }
}
```

Relative paths are read from the directory of the configuration file. Instead of a
`roster`, the drivers can be listed directly with `"drivers": ["Ana", "Bob"]`. The
options of the command line override the configuration file.

## Reproducible draws

With a `randomSeed` (or `--seed`), the same inputs always give the same draw. The seed
is any text, for example the name of the event. Without a seed, every draw is
different.

## Output

The summary of the draw is written in JSON format:

```json
{
  "config": { "event": "Round 3", "date": "2026-10-18", "seed": "round-3", "fallbackMode": "greedy" },
  "results": {
    "perfect": true,
    "cannotAvoid": [],
    "repeated": [],
    "assignments": [ { "driver": "Ana Lopez", "kart": "3", "repeat": false } ]
  }
}
```

`perfect` tells if every driver got a new kart. With `--reel`, each assignment also
carries the `reel` of labels shown before the kart is revealed.

With `--reference`, the summary is compared to a previous summary, and the differences
are printed. This is how past draws can be checked again from their seed.

*/
